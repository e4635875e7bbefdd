//! RawReading -> SubmissionPayload。
//!
//! 时间戳按固定格式以 UTC 解析，加 +05:30 后转 epoch 秒；
//! 水位与温度按 [`FieldMapping`] 指定的槽位解析为浮点数。

use chrono::{NaiveDateTime, TimeDelta};
use domain::{FieldMapping, RawReading, SubmissionPayload};

/// 应用标签。
pub const APP_TAG: &str = "AE-WM-WL";
/// 数据格式版本标签。
pub const VERSION_TAG: &str = "V1.0.0";
/// 应用 + 版本组合标签。
pub const APP_VERSION_TAG: &str = "WM-WL-V1.0.0";
/// `created_at` 的固定格式。
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
/// 固定区域时差：+5 小时 30 分。
pub const REGIONAL_OFFSET_SECONDS: i64 = 5 * 3600 + 30 * 60;

/// 转换错误：该节点本轮放弃提交。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("timestamp parse error: {value:?}: {reason}")]
    TimestampParse { value: String, reason: String },
    #[error("field extraction error: {field}: {reason}")]
    FieldExtraction { field: String, reason: String },
}

/// 载荷转换器。
#[derive(Debug, Clone, Default)]
pub struct PayloadTransformer {
    mapping: FieldMapping,
}

impl PayloadTransformer {
    pub fn new(mapping: FieldMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// 任一步失败都不产生部分载荷。
    pub fn transform(
        &self,
        node_id: &str,
        reading: &RawReading,
    ) -> Result<SubmissionPayload, TransformError> {
        let epoch_time = epoch_seconds(&reading.created_at)?;
        let water_level = extract_field(reading, &self.mapping.water_level)?;
        let temperature = extract_field(reading, &self.mapping.temperature)?;

        Ok(SubmissionPayload {
            labels: labels_for(node_id),
            content: content_string(epoch_time, water_level, temperature),
        })
    }
}

/// 固定四元标签：应用、节点、版本、应用+版本。
pub fn labels_for(node_id: &str) -> Vec<String> {
    vec![
        APP_TAG.to_string(),
        node_id.to_string(),
        VERSION_TAG.to_string(),
        APP_VERSION_TAG.to_string(),
    ]
}

/// `created_at` -> 加区域时差后的 epoch 秒。
pub fn epoch_seconds(created_at: &str) -> Result<i64, TransformError> {
    let parsed = NaiveDateTime::parse_from_str(created_at, TIMESTAMP_FORMAT).map_err(|err| {
        TransformError::TimestampParse {
            value: created_at.to_string(),
            reason: err.to_string(),
        }
    })?;
    // %Y 接受带符号的扩展年份，加时差可能越界
    let shifted = parsed
        .checked_add_signed(TimeDelta::seconds(REGIONAL_OFFSET_SECONDS))
        .ok_or_else(|| TransformError::TimestampParse {
            value: created_at.to_string(),
            reason: "out of range".to_string(),
        })?;
    Ok(shifted.and_utc().timestamp())
}

fn extract_field(reading: &RawReading, slot: &str) -> Result<f64, TransformError> {
    let raw = reading
        .field(slot)
        .ok_or_else(|| TransformError::FieldExtraction {
            field: slot.to_string(),
            reason: "missing".to_string(),
        })?;
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|err| TransformError::FieldExtraction {
            field: slot.to_string(),
            reason: format!("{:?}: {}", raw, err),
        })?;
    if !value.is_finite() {
        return Err(TransformError::FieldExtraction {
            field: slot.to_string(),
            reason: format!("{:?}: not finite", raw),
        });
    }
    Ok(value)
}

/// `[epoch, water_level, temperature]`，分隔符 `", "`，浮点保留小数点。
fn content_string(epoch_time: i64, water_level: f64, temperature: f64) -> String {
    format!(
        "[{}, {}, {}]",
        epoch_time,
        json_float(water_level),
        json_float(temperature)
    )
}

fn json_float(value: f64) -> String {
    serde_json::Number::from_f64(value)
        .map(|number| number.to_string())
        .unwrap_or_else(|| value.to_string())
}
