use log::warn;

/// Best-effort removal of a stored image file. A replaced or orphaned image
/// must never abort the mutation that triggered the cleanup, so failures are
/// only logged.
pub async fn clear_image(file_path: &str) {
    if let Err(err) = tokio::fs::remove_file(file_path).await {
        warn!("Failed to remove image {}: {}", file_path, err);
    }
}
