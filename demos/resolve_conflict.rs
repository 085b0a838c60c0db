//! Demo: a dependency pins an exact version that was never registered,
//! producing a fatal, typed error instead of a silent bad resolution.

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

    let pin = resolver.get_constraint("logging", "=1.2.3").unwrap();
    let mut app = unit("app", "1.0.0", "1.0.0");
    app.add_dependency(Rc::from("logging")).unwrap();
    app.add_constraint(pin).unwrap();
    resolver.add_unit_version(app);

    // logging@1.2.3 is never registered — only an unrelated version is.
    resolver.add_unit_version(unit("logging", "1.2.4", "1.0.0"));

    match resolver.resolve(&["app"], &[], &[], &ResolveOptions::default()) {
        Ok(chosen) => {
            for uv in chosen {
                println!("{uv}");
            }
        }
        Err(e) => eprintln!("resolution failed as expected: {e}"),
    }
}
