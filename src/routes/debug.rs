pub async fn routing() -> &'static str {
    tracing::info!("debug routing endpoint hit");
    "Routing is working"
}
