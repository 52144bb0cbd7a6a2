// ==========================================
// 宿舍分配系统 - 字段映射与类型转换
// ==========================================
// 原始记录 → 强类型字段，错误带行号与字段名
// ==========================================

use crate::domain::types::Gender;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use std::str::FromStr;

pub struct FieldMapper;

impl FieldMapper {
    /// 必填文本字段
    pub fn required_str<'a>(record: &'a RawRecord, field: &str) -> ImportResult<&'a str> {
        record.get(field).ok_or_else(|| ImportError::MissingField {
            row: record.row,
            field: field.to_string(),
        })
    }

    /// 必填数值字段
    pub fn required_num<T>(record: &RawRecord, field: &str) -> ImportResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = Self::required_str(record, field)?;
        Self::parse_num(record.row, field, raw)
    }

    /// 可选数值字段（空单元格为 None）
    pub fn optional_num<T>(record: &RawRecord, field: &str) -> ImportResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        record
            .get(field)
            .map(|raw| Self::parse_num(record.row, field, raw))
            .transpose()
    }

    /// 必填性别字段
    pub fn required_gender(record: &RawRecord, field: &str) -> ImportResult<Gender> {
        let raw = Self::required_str(record, field)?;
        Gender::parse(raw).ok_or_else(|| ImportError::TypeConversionError {
            row: record.row,
            field: field.to_string(),
            message: format!("无法识别的性别: {}", raw),
        })
    }

    fn parse_num<T>(row: usize, field: &str, raw: &str) -> ImportResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        // Excel 数值单元格可能带 ".0"
        let normalized = raw.strip_suffix(".0").unwrap_or(raw);
        normalized.parse::<T>().map_err(|e| ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message: format!("{} ({})", e, raw),
        })
    }
}
