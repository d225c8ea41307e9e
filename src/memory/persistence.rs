//! 消息日志持久化
//!
//! 每次成功的 run 追加一条 {query, response, timestamp}；JsonMessageLog 以单个 JSON 数组文件保存。

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 单条日志：用户请求、最终文稿与时间
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLogEntry {
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageLogEntry {
    pub fn now(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
            timestamp: Utc::now(),
        }
    }
}

/// 持久化层接口：核心只负责追加
pub trait MessageLog: Send + Sync {
    fn append(&self, entry: MessageLogEntry) -> anyhow::Result<()>;

    fn entries(&self) -> anyhow::Result<Vec<MessageLogEntry>>;
}

/// 文件持久化：单文件 JSON 数组；追加时读-改-写，锁保证同进程内串行
#[derive(Debug)]
pub struct JsonMessageLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonMessageLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> anyhow::Result<Vec<MessageLogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&data)?)
    }
}

impl MessageLog for JsonMessageLog {
    /// 父目录不存在时自动创建
    fn append(&self, entry: MessageLogEntry) -> anyhow::Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("message log lock poisoned"))?;
        let mut entries = self.load()?;
        entries.push(entry);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }

    fn entries(&self) -> anyhow::Result<Vec<MessageLogEntry>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("message log lock poisoned"))?;
        self.load()
    }
}

/// 内存日志（测试或不落盘时使用）
#[derive(Debug, Default)]
pub struct InMemoryMessageLog {
    entries: Mutex<Vec<MessageLogEntry>>,
}

impl InMemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageLog for InMemoryMessageLog {
    fn append(&self, entry: MessageLogEntry) -> anyhow::Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("message log lock poisoned"))?
            .push(entry);
        Ok(())
    }

    fn entries(&self) -> anyhow::Result<Vec<MessageLogEntry>> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("message log lock poisoned"))?
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_log_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonMessageLog::new(dir.path().join("nested/messages.json"));
        assert!(log.entries().unwrap().is_empty());

        log.append(MessageLogEntry::now("first task", "first essay")).unwrap();
        log.append(MessageLogEntry::now("second task", "second essay")).unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "first task");
        assert_eq!(entries[1].response, "second essay");
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }

    #[test]
    fn test_json_log_reloads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.json");
        JsonMessageLog::new(&path)
            .append(MessageLogEntry::now("task", "essay"))
            .unwrap();

        let reopened = JsonMessageLog::new(&path);
        assert_eq!(reopened.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_in_memory_log() {
        let log = InMemoryMessageLog::new();
        log.append(MessageLogEntry::now("q", "r")).unwrap();
        assert_eq!(log.entries().unwrap()[0].query, "q");
    }
}
