// ==========================================
// 宿舍分配系统 - 导入层
// ==========================================
// 职责: 外部名册/房间文件导入 SQLite
// 支持: Excel (.xlsx), CSV
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod room_importer;
pub mod student_importer;
pub mod summary;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use room_importer::RoomImporter;
pub use student_importer::StudentImporter;
pub use summary::ImportSummary;
