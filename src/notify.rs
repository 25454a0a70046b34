use std::{collections::VecDeque, sync::Arc};

use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    pub fn css_class(self) -> &'static str {
        match self {
            NoticeKind::Success => "notice notice-success",
            NoticeKind::Error => "notice notice-error",
            NoticeKind::Info => "notice notice-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// One-shot messages shown on the next rendered page, then dropped.
#[derive(Clone, Default)]
pub struct Notices {
    queue: Arc<Mutex<VecDeque<Notice>>>,
}

impl Notices {
    pub async fn push(&self, kind: NoticeKind, text: impl Into<String>) {
        self.queue.lock().await.push_back(Notice {
            kind,
            text: text.into(),
        });
    }

    pub async fn success(&self, text: impl Into<String>) {
        self.push(NoticeKind::Success, text).await
    }

    pub async fn error(&self, text: impl Into<String>) {
        self.push(NoticeKind::Error, text).await
    }

    pub async fn info(&self, text: impl Into<String>) {
        self.push(NoticeKind::Info, text).await
    }

    pub async fn drain(&self) -> Vec<Notice> {
        self.queue.lock().await.drain(..).collect()
    }
}

#[cfg(test)]
mod notify_tests {
    use super::*;

    #[tokio::test]
    async fn notices_are_delivered_once_in_order() {
        let notices = Notices::default();
        notices.success("Food logged successfully!").await;
        notices.error("Search failed").await;

        let first = notices.drain().await;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].kind, NoticeKind::Success);
        assert_eq!(first[1].text, "Search failed");
        assert!(notices.drain().await.is_empty());
    }
}
