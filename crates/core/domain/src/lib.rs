pub mod data;

pub use data::{FieldMapping, RawReading, SubmissionPayload};

/// 单个节点的静态配置：启动时加载一次，运行期只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub node_id: String,
    pub channel_id: String,
    pub api_key: String,
    /// oneM2M content instance 提交地址。
    pub endpoint: String,
    /// `X-M2M-Origin` 头的值。
    pub origin: String,
}

impl NodeConfig {
    pub fn new(
        node_id: impl Into<String>,
        channel_id: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            channel_id: channel_id.into(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            origin: origin.into(),
        }
    }
}

/// 去重依据：按哪个水位判断读数是否为新。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// 转换成功即视为已处理，提交失败不重试。
    #[default]
    AtMostOnce,
    /// 只有中间件返回 201 才视为已处理，提交失败的读数下一轮重提。
    UntilDelivered,
}

impl DeliveryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryPolicy::AtMostOnce => "at-most-once",
            DeliveryPolicy::UntilDelivered => "until-delivered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "at-most-once" | "at_most_once" => Some(DeliveryPolicy::AtMostOnce),
            "until-delivered" | "until_delivered" => Some(DeliveryPolicy::UntilDelivered),
            _ => None,
        }
    }
}

/// 节点运行状态：只记录水位，不缓存读数内容。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    /// 最近一次转换成功的 entry_id。
    pub last_entry_id: Option<i64>,
    /// 最近一次中间件确认（201）的 entry_id。
    pub last_delivered_entry_id: Option<i64>,
}

impl NodeState {
    /// 按策略取用于去重的水位。
    pub fn watermark(&self, policy: DeliveryPolicy) -> Option<i64> {
        match policy {
            DeliveryPolicy::AtMostOnce => self.last_entry_id,
            DeliveryPolicy::UntilDelivered => self.last_delivered_entry_id,
        }
    }

    /// 读数 id 与水位不同（含尚无水位）即为新数据。
    pub fn is_new(&self, entry_id: i64, policy: DeliveryPolicy) -> bool {
        self.watermark(policy) != Some(entry_id)
    }

    pub fn mark_seen(&mut self, entry_id: i64) {
        self.last_entry_id = Some(entry_id);
    }

    pub fn mark_delivered(&mut self, entry_id: i64) {
        self.last_delivered_entry_id = Some(entry_id);
    }
}
