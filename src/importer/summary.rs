// ==========================================
// 宿舍分配系统 - 导入结果汇总
// ==========================================

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub file: String,       // 源文件路径
    pub total_rows: usize,  // 非空数据行数
    pub imported: usize,    // 写入记录数
    pub elapsed_ms: u128,   // 耗时
}
