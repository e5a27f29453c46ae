//! `ce-lib-wizard add` command

use anyhow::Result;

use crate::cli::AddArgs;
use crate::commands::{module_proxy, tag_probe};
use crate::GlobalOptions;
use libwizard::ops::{AddOptions, PathCheck, Wizard, WizardError};
use libwizard::util::Status;
use libwizard::LibraryRequest;

pub fn execute(args: AddArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let mut config = global_opts.config.clone();
    if args.keep_temp {
        config.install.keep_temp = true;
    }
    if args.no_setup {
        config.install.run_setup = false;
    }

    let origin = args.url.as_deref().or(args.module.as_deref());
    let mut request = LibraryRequest::new(
        args.lang,
        origin,
        args.crate_name.as_deref(),
        &args.versions,
    )
    .map_err(WizardError::from)?;
    if let Some(id) = args.library_id {
        request = request.with_library_id(id).map_err(WizardError::from)?;
    }
    if let Some(ty) = args.library_type {
        request = request.with_library_type(ty);
    }

    let mut opts = AddOptions::new(&args.infra, &args.main, &config);
    opts.install_test = args.install_test;

    let tags = tag_probe(&config)?;
    let modules = module_proxy(&config)?;
    let wizard = Wizard::new(opts, &config, &tags, &modules);

    let spinner = shell.spinner(
        Status::Resolving,
        format!("{} {}", request.origin().as_str(), request.versions().join(", ")),
    );
    let report = wizard.add(&request);
    spinner.finish();
    let report = report?;

    if let Some(ref module) = report.module {
        shell.status(Status::Resolving, format!("module root {}", module));
    }
    if let Some(ref import_path) = report.import_path {
        shell.note(format!("import path {}", import_path));
    }
    if let Some(decision) = report.library_type {
        shell.note(format!(
            "type {} ({})",
            decision.library_type, decision.source
        ));
    }
    if let Some(ref prefix) = report.target_prefix {
        shell.note(format!("target prefix `{}`", prefix));
    }

    for check in &report.path_checks {
        match check {
            PathCheck::Consistent { destination } => {
                shell.status(Status::Verified, destination)
            }
            PathCheck::Skipped => shell.status(Status::Skipped, "path consistency check"),
        }
    }
    for destination in &report.installed {
        shell.status(Status::Installing, format!("installed to {}", destination));
    }

    shell.status(
        Status::Added,
        format!(
            "{} {} ({})",
            report.language,
            report.library_id,
            report.versions.join(", ")
        ),
    );
    for file in &report.modified {
        shell.status(Status::Updated, file.display());
    }

    Ok(())
}
