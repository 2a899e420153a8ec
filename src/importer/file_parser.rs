// ==========================================
// 联系人名单分配系统 - 文件解析器实现
// ==========================================
// 支持: CSV (.csv) 流式读取 / Excel (.xlsx/.xls) 首个工作表
// 规则: 首行为表头；表头与单元格去除首尾空白；Excel 全空行跳过
// ==========================================

use crate::domain::contact::RawRow;
use crate::domain::types::FileFormat;
use crate::importer::error::{IngestError, IngestResult};
use crate::importer::ingest_trait::{FileParser, RawRows};
use calamine::{open_workbook_auto_from_rs, Reader};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_rows(&self, file_path: &Path) -> IngestResult<RawRows> {
        let file = File::open(file_path)
            .map_err(|e| IngestError::ParseError(format!("无法打开 CSV 文件: {}", e)))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .trim(Trim::All)
            .from_reader(file);

        // 读取表头（去除 UTF-8 BOM）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        debug!(columns = headers.len(), "CSV 表头读取完成");

        // 空行由 csv 读取器忽略；仅含分隔符的行保留，交由规范化阶段按行号报告
        let rows = reader.into_records().map(move |result| -> IngestResult<RawRow> {
            let record = result?;
            Ok(RawRow::from_pairs(
                headers
                    .iter()
                    .zip(record.iter())
                    .filter(|(header, _)| !header.is_empty())
                    .map(|(header, value)| (header.clone(), value.trim().to_string())),
            ))
        });

        Ok(RawRows::new(rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 按内容识别 xlsx/xls（不依赖文件名后缀）
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_rows(&self, file_path: &Path) -> IngestResult<RawRows> {
        let bytes = std::fs::read(file_path)
            .map_err(|e| IngestError::ParseError(format!("无法打开 Excel 文件: {}", e)))?;

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
            IngestError::ParseError(format!("Excel 文件已损坏或格式无法识别: {}", e))
        })?;

        // 只读第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| IngestError::ParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| IngestError::ParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        // 读取数据行
        let mut records = Vec::new();
        for data_row in rows {
            let mut row = RawRow::new();
            for (col_idx, cell) in data_row.iter().enumerate() {
                match headers.get(col_idx) {
                    Some(header) if !header.is_empty() => {
                        row.insert(header.clone(), cell.to_string().trim().to_string());
                    }
                    _ => {}
                }
            }

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }
            records.push(row);
        }

        if records.is_empty() {
            return Err(IngestError::ParseError("Excel 文件不含数据".to_string()));
        }

        debug!(sheet = %sheet_name, rows = records.len(), "Excel 工作表读取完成");
        Ok(RawRows::from_vec(records))
    }
}

// ==========================================
// 通用文件解析器（根据已校验的格式选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parser_for(format: FileFormat) -> Box<dyn FileParser> {
        if format.is_workbook() {
            Box::new(ExcelParser)
        } else {
            Box::new(CsvParser)
        }
    }

    pub fn parse<P: AsRef<Path>>(&self, file_path: P, format: FileFormat) -> IngestResult<RawRows> {
        Self::parser_for(format).parse_rows(file_path.as_ref())
    }
}
