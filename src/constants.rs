/// Platform identifiers understood by `docker buildx build --platform`
pub mod platform {
    /// Linux ARM64 platform identifier
    pub const LINUX_ARM64: &str = "linux/arm64";

    /// Linux AMD64 platform identifier
    pub const LINUX_AMD64: &str = "linux/amd64";
}

/// Defaults applied to a compose `build` section
pub mod build {
    /// Dockerfile used when the service does not name one
    pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

    /// Build context used when the service does not name one
    pub const DEFAULT_CONTEXT: &str = ".";
}

/// External programs driven by the tool
pub mod command {
    /// Docker CLI providing the `buildx` plugin
    pub const DOCKER: &str = "docker";

    /// Standalone compose binary (v1 and the v2 compatibility shim)
    pub const DOCKER_COMPOSE: &str = "docker-compose";
}
