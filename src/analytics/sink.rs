use super::ClickRecord;

/// 点击日志 Sink
#[async_trait::async_trait]
pub trait ClickSink: Send + Sync {
    /// 记录单条点击日志
    async fn log_click(&self, record: ClickRecord) -> anyhow::Result<()> {
        self.log_clicks_batch(vec![record]).await
    }

    /// 批量记录点击日志
    async fn log_clicks_batch(&self, records: Vec<ClickRecord>) -> anyhow::Result<()>;
}

pub struct StdoutSink;

#[async_trait::async_trait]
impl ClickSink for StdoutSink {
    async fn log_clicks_batch(&self, records: Vec<ClickRecord>) -> anyhow::Result<()> {
        println!("Click logs batch: {} entries", records.len());
        for record in &records {
            println!("  - {:?}", record);
        }
        Ok(())
    }
}
