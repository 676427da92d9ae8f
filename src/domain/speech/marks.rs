//! Speech Context - 时间标记
//!
//! 远程合成服务以 JSON Lines 输出标记，每行一个对象：
//! `{"time":6,"type":"word","start":0,"end":2,"value":"Hi"}`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SpeechError;

/// 请求的标记类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    Word,
    Sentence,
}

impl MarkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Sentence => "sentence",
        }
    }
}

/// 单条时间标记
///
/// 字段按远程服务的原样透传，这里只提供常用字段的读取方法。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkEntry(Map<String, Value>);

impl MarkEntry {
    pub fn mark_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn time(&self) -> Option<u64> {
        self.0.get("time").and_then(Value::as_u64)
    }

    pub fn value(&self) -> Option<&str> {
        self.0.get("value").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// 解析标记流
///
/// 按换行切分，跳过空行，其余每行必须是一个 JSON 对象。输出顺序与源顺序一致。
pub fn parse_marks(raw: &[u8]) -> Result<Vec<MarkEntry>, SpeechError> {
    let text = std::str::from_utf8(raw).map_err(|_| SpeechError::NonUtf8Marks)?;

    text.split('\n')
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<MarkEntry>(line).map_err(|e| SpeechError::InvalidMark {
                line: index + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}
