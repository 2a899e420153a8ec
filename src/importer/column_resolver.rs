// ==========================================
// 联系人名单分配系统 - 列名解析器
// ==========================================
// 职责: 源表头 → 标准字段（firstName / phone / notes）
// 规则: 忽略大小写的精确匹配（非子串），按文件列顺序取第一个命中的表头
// 约束: 每次导入只解析一次（取第一行表头），各格式共用
// ==========================================

use crate::domain::types::CanonicalField;
use serde::Serialize;

/// 姓名列别名
pub const NAME_ALIASES: [&str; 6] = [
    "FirstName",
    "firstname",
    "first_name",
    "Name",
    "name",
    "First Name",
];

/// 电话列别名
pub const PHONE_ALIASES: [&str; 7] = [
    "Phone",
    "phone",
    "contact",
    "mobile",
    "Mobile",
    "PhoneNumber",
    "Phone Number",
];

/// 备注列别名
pub const NOTES_ALIASES: [&str; 4] = ["Notes", "notes", "description", "Description"];

// ==========================================
// ColumnResolution - 解析结果（实际表头名）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnResolution {
    pub name_key: Option<String>,
    pub phone_key: Option<String>,
    pub notes_key: Option<String>,
}

impl ColumnResolution {
    /// 未解析到的必填字段
    pub fn missing_required(&self) -> Vec<CanonicalField> {
        let mut missing = Vec::new();
        if self.name_key.is_none() {
            missing.push(CanonicalField::FirstName);
        }
        if self.phone_key.is_none() {
            missing.push(CanonicalField::Phone);
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.name_key.is_some() && self.phone_key.is_some()
    }

    /// 字段 → 表头
    pub fn key_for(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::FirstName => self.name_key.as_deref(),
            CanonicalField::Phone => self.phone_key.as_deref(),
            CanonicalField::Notes => self.notes_key.as_deref(),
        }
    }
}

// ==========================================
// ColumnResolver
// ==========================================
pub struct ColumnResolver;

impl ColumnResolver {
    /// 解析表头集合
    ///
    /// # 参数
    /// - headers: 单行的表头（文件列顺序）
    ///
    /// # 返回
    /// - ColumnResolution: 未命中的字段为 None，由调用方决定是否报错
    pub fn resolve<'a, I>(&self, headers: I) -> ColumnResolution
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<&str> = headers.into_iter().collect();

        ColumnResolution {
            name_key: Self::find_alias(&headers, &NAME_ALIASES),
            phone_key: Self::find_alias(&headers, &PHONE_ALIASES),
            notes_key: Self::find_alias(&headers, &NOTES_ALIASES),
        }
    }

    /// 别名表（供错误提示使用）
    pub fn aliases(field: CanonicalField) -> &'static [&'static str] {
        match field {
            CanonicalField::FirstName => &NAME_ALIASES,
            CanonicalField::Phone => &PHONE_ALIASES,
            CanonicalField::Notes => &NOTES_ALIASES,
        }
    }

    fn find_alias(headers: &[&str], aliases: &[&str]) -> Option<String> {
        headers
            .iter()
            .find(|header| {
                let normalized = header.trim().to_lowercase();
                aliases.iter().any(|alias| alias.to_lowercase() == normalized)
            })
            .map(|header| header.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(headers: &[&str]) -> ColumnResolution {
        ColumnResolver.resolve(headers.iter().copied())
    }

    #[test]
    fn test_resolve_title_case_headers() {
        let r = resolve(&["First Name", "Phone", "Notes"]);
        assert_eq!(r.name_key.as_deref(), Some("First Name"));
        assert_eq!(r.phone_key.as_deref(), Some("Phone"));
        assert_eq!(r.notes_key.as_deref(), Some("Notes"));
    }

    #[test]
    fn test_resolution_is_case_insensitive_and_equivalent() {
        let a = resolve(&["First Name", "Phone", "Notes"]);
        let b = resolve(&["firstname", "phone", "notes"]);
        for field in [
            CanonicalField::FirstName,
            CanonicalField::Phone,
            CanonicalField::Notes,
        ] {
            assert_eq!(a.key_for(field).is_some(), b.key_for(field).is_some());
        }
        assert!(a.is_complete() && b.is_complete());

        let upper = resolve(&["FIRST_NAME", "MOBILE"]);
        assert_eq!(upper.name_key.as_deref(), Some("FIRST_NAME"));
        assert_eq!(upper.phone_key.as_deref(), Some("MOBILE"));
    }

    #[test]
    fn test_resolve_is_exact_not_substring() {
        let r = resolve(&["Customer Name", "Phone Ext", "Notes2"]);
        assert_eq!(r, ColumnResolution::default());
        assert_eq!(
            r.missing_required(),
            vec![CanonicalField::FirstName, CanonicalField::Phone]
        );
    }

    #[test]
    fn test_first_matching_header_wins() {
        let r = resolve(&["name", "contact", "FirstName", "Phone"]);
        assert_eq!(r.name_key.as_deref(), Some("name"));
        assert_eq!(r.phone_key.as_deref(), Some("contact"));
    }

    #[test]
    fn test_notes_optional() {
        let r = resolve(&["Name", "Phone Number"]);
        assert!(r.is_complete());
        assert!(r.notes_key.is_none());
        assert!(r.missing_required().is_empty());
    }

    #[test]
    fn test_headers_with_padding_match() {
        let r = resolve(&["  phonenumber ", "description", "name"]);
        assert_eq!(r.phone_key.as_deref(), Some("  phonenumber "));
        assert_eq!(r.notes_key.as_deref(), Some("description"));
    }
}
