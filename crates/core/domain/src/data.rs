use std::collections::BTreeMap;

/// 遥测服务返回的单条最新读数。
///
/// `fields` 只保留 `field1..fieldN` 槽位，值为原始文本，`None` 表示槽位为 null。
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub entry_id: i64,
    pub created_at: String,
    pub fields: BTreeMap<String, Option<String>>,
}

impl RawReading {
    pub fn field(&self, slot: &str) -> Option<&str> {
        self.fields.get(slot).and_then(|value| value.as_deref())
    }
}

/// 物理量到 field 槽位的映射，由遥测通道的配置决定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub water_level: String,
    pub temperature: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            water_level: "field6".to_string(),
            temperature: "field7".to_string(),
        }
    }
}

/// 提交给中间件的 content instance 内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub labels: Vec<String>,
    /// `[epoch, water_level, temperature]` 的 JSON 列表文本。
    pub content: String,
}
