pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_COMMIT: &str = "local";
pub const CPU_DEVICE: &str = "cpu";

/// Process-level settings resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
	pub commit: String,
	pub seed: u64,
	pub device: String,
}

impl Config {
	pub fn load() -> Self {
		let _ = dotenvy::dotenv();
		let commit = std::env::var("GITHUB_SHA").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| DEFAULT_COMMIT.to_string());
		Self { commit, ..Self::default() }
	}
}

impl Default for Config {
	fn default() -> Self {
		Self { commit: DEFAULT_COMMIT.to_string(), seed: DEFAULT_SEED, device: CPU_DEVICE.to_string() }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_is_local_cpu_seed_42() {
		let cfg = Config::default();
		assert_eq!(cfg.commit, "local");
		assert_eq!(cfg.device, "cpu");
		assert_eq!(cfg.seed, 42);
	}
}
