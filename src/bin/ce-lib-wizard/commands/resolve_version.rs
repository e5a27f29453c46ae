//! `ce-lib-wizard resolve-version` command

use anyhow::Result;

use crate::cli::ResolveVersionArgs;
use crate::commands::tag_probe;
use crate::GlobalOptions;
use libwizard::core::request::split_versions;
use libwizard::resolver::version::ResolvedVersion;
use libwizard::util::Status;
use libwizard::{VersionResolver, WizardError};

pub fn execute(args: ResolveVersionArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let versions = split_versions(&args.versions);
    if versions.is_empty() {
        return Err(WizardError::from(libwizard::core::RequestError::NoVersions).into());
    }

    let probe = tag_probe(&global_opts.config)?;
    let resolver = VersionResolver::new(&probe);

    let results: Vec<ResolvedVersion> = versions
        .iter()
        .map(|version| resolver.resolve(&args.origin, version))
        .collect();

    for (version, resolved) in versions.iter().zip(&results) {
        let tag = format!(
            "{}{}",
            resolved.prefix.as_deref().unwrap_or_default(),
            resolved.version
        );
        if resolved.exists {
            shell.status(Status::Verified, format!("{} (tag {})", version, tag));
        } else {
            shell.status(Status::Warning, format!("{} not found upstream", version));
        }
    }

    let resolved = VersionResolver::unify(&args.origin, &versions, &results)
        .map_err(WizardError::from)?;
    match resolved.target_prefix {
        Some(prefix) => shell.print(format!("target_prefix: {}", prefix)),
        None => shell.print("target_prefix: (none)"),
    }

    Ok(())
}
