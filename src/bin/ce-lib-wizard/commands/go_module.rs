//! `ce-lib-wizard go-module` command

use anyhow::Result;

use crate::cli::GoModuleArgs;
use crate::commands::module_proxy;
use crate::GlobalOptions;
use libwizard::core::identifier::normalize_go_version;
use libwizard::resolver::ResolveError;
use libwizard::util::Status;
use libwizard::{GoModuleResolver, WizardError};

pub fn execute(args: GoModuleArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let version = normalize_go_version(args.version.trim());
    let path = args.module.trim().trim_end_matches('/');

    let proxy = module_proxy(&global_opts.config)?;
    let resolver = GoModuleResolver::new(&proxy);

    let spinner = shell.spinner(Status::Resolving, format!("{}@{}", path, version));
    let resolution = resolver.resolve_module(path, &version);
    let found = resolver.version_exists(&resolution.module, &version);
    let import_path = match (found, resolution.import_override.clone()) {
        (false, _) => None,
        (true, Some(import_path)) => Some(import_path),
        (true, None) => resolver.detect_import_path(&resolution.module, &version),
    };
    spinner.finish();

    if !found {
        return Err(WizardError::from(ResolveError::ModuleNotFound {
            module: path.to_string(),
            version,
        })
        .into());
    }

    shell.print(format!("module: {}", resolution.module));
    shell.print(format!("version: {}", version));
    match import_path {
        Some(import_path) => shell.print(format!("import_path: {}", import_path)),
        None => shell.print("import_path: (module root)"),
    }

    Ok(())
}
