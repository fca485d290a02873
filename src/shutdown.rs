use tokio::sync::watch;

/// 优雅关闭管理器
///
/// 基于 watch 通道：每个组件持有一个接收端，
/// `shutdown` 翻转标志后所有组件各自收尾退出。
pub struct ShutdownManager {
    sender: watch::Sender<bool>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    pub fn shutdown(&self) {
        let _ = self.sender.send(true);
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
