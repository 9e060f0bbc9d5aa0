/// Read a configuration value from the environment, preferring the
/// namespaced form.
///
/// `KEYWAY_{key}` wins when both are set; the bare `{key}` fallback keeps
/// platform-injected variables like `PORT` working without duplication.
///
/// # Examples
///
/// ```rust
/// use keyway::utils::get_env_with_prefix;
///
/// // Reads KEYWAY_PORT, or PORT if the namespaced form is absent
/// let port = get_env_with_prefix("PORT");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("KEYWAY_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}
