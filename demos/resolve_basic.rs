//! Demo: resolve a small package universe with a transitive, inexact
//! dependency — mirrors the "trivial" and "transitive inexact" scenarios.

use std::rc::Rc;

use depsolve::{ResolveOptions, Resolver, UnitVersion};
use semver::Version;

fn unit(name: &str, version: &str, ecv: &str) -> UnitVersion {
    UnitVersion::new(
        Rc::from(name),
        Version::parse(version).unwrap(),
        Version::parse(ecv).unwrap(),
    )
}

fn main() {
    let mut resolver = Resolver::new();

    resolver.add_unit_version(unit("left-pad", "1.0.0", "1.0.0"));

    let http_req = resolver.get_constraint("http-client", "2.0.0").unwrap();
    let mut app = unit("app", "1.0.0", "1.0.0");
    app.add_dependency(Rc::from("http-client")).unwrap();
    app.add_constraint(http_req).unwrap();
    resolver.add_unit_version(app);

    resolver.add_unit_version(unit("http-client", "2.0.0", "2.0.0"));
    resolver.add_unit_version(unit("http-client", "2.3.1", "2.0.0"));

    let chosen = resolver
        .resolve(&["left-pad", "app"], &[], &[], &ResolveOptions::default())
        .expect("resolution should succeed");

    for uv in &chosen {
        println!("{uv}");
    }
}
