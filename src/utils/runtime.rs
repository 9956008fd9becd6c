use anyhow::Result;


/// Sampling, probing and writing all happen on one thread, one step after another.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
