use cargo_toml::{Dependency, Manifest};

#[inline]
pub(crate) fn fjall_version() -> Result<String, String> {
    let cargo_toml = include_str!("../Cargo.toml");
    let manifest = Manifest::from_str(cargo_toml)
        .map_err(|e| format!("Failed to parse Cargo.toml: {}", e))?;
    
    let dependency = manifest.dependencies.get("fjall")
        .ok_or_else(|| "fjall dependency not found in Cargo.toml".to_string())?;
    
    match dependency {
        Dependency::Simple(version) => Ok(version.clone()),
        Dependency::Detailed(d) => {
            d.version.as_ref()
                .cloned()
                .ok_or_else(|| "fjall dependency version not specified".to_string())
        },
        Dependency::Inherited(_) => {
            Err("Inherited fjall dependency not supported".to_string())
        },
    }
}
