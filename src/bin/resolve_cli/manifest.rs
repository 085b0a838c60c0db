//! TOML manifest format consumed by the `resolve-cli` binary.
//!
//! Describes the universe of available unit versions plus the set of names
//! to resolve. Not part of the library: the core resolver never touches
//! disk or a serialization format, per its own scope.

use std::path::Path;

use depsolve::{ResolveError, Resolver, UnitVersion};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid version in manifest: {0}")]
    Version(#[from] semver::Error),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(rename = "package", default)]
    packages: Vec<RawPackage>,
    request: RawRequest,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,
    version: String,
    ecv: String,
    #[serde(default)]
    dependencies: Vec<String>,
    /// Each entry is `"name@version"` (at-least) or `"name@=version"` (exact).
    #[serde(default)]
    constraints: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    names: Vec<String>,
    #[serde(default)]
    constraints: Vec<String>,
}

/// The parsed request half of a manifest: names to resolve plus any
/// top-level constraints to seed the search with.
pub struct Request {
    pub names: Vec<String>,
    pub constraint_specs: Vec<String>,
}

/// Parse `path`, populate a fresh [`Resolver`] from its `[[package]]`
/// entries, and return it alongside the parsed request.
pub fn load(path: &Path) -> Result<(Resolver, Request), ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let raw: RawManifest = toml::from_str(&text)?;

    let mut resolver = Resolver::new();
    for package in raw.packages {
        let mut uv = UnitVersion::new(
            package.name.clone().into(),
            semver::Version::parse(&package.version)?,
            semver::Version::parse(&package.ecv)?,
        );
        for dep in package.dependencies {
            uv.add_dependency(dep.into())?;
        }
        for spec in &package.constraints {
            let constraint = resolver.get_constraint_str(spec)?;
            uv.add_constraint(constraint)?;
        }
        resolver.add_unit_version(uv);
    }

    let request = Request {
        names: raw.request.names,
        constraint_specs: raw.request.constraints,
    };
    Ok((resolver, request))
}
