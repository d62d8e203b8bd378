mod env_overrides;
mod interpolate;
mod loader;
mod types;
mod validate;

#[cfg(test)]
mod test_env;

pub use types::Config;
