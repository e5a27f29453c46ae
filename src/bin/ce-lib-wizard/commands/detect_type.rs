//! `ce-lib-wizard detect-type` command

use anyhow::{bail, Result};

use crate::cli::DetectTypeArgs;
use crate::GlobalOptions;
use libwizard::analysis::{RepositoryAnalysis, RepositoryAnalyzer};
use libwizard::resolver::{resolve_type, TypeSource};
use libwizard::util::Status;
use libwizard::{Catalogue, Language};

pub fn execute(args: DetectTypeArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    if !matches!(args.lang, Language::C | Language::Cpp) {
        bail!("detect-type only supports C and C++ libraries");
    }

    let catalogue = match args.infra {
        Some(ref infra) => Catalogue::load_from_infra(infra)?,
        None => Catalogue::default(),
    };
    let existing = catalogue.find_entry(&args.url, args.library_id.as_deref());
    if let Some(entry) = existing {
        shell.note(format!(
            "catalogue entry {}/{}",
            entry.section, entry.identifier
        ));
    }

    let mut decision = resolve_type(&RepositoryAnalysis::default(), existing, args.lang);
    let mut analysis = None;
    if decision.source == TypeSource::Detected {
        let spinner = shell.spinner(Status::Analyzing, &args.url);
        let result = RepositoryAnalyzer::new(args.keep_temp || global_opts.config.install.keep_temp)
            .analyze(&args.url);
        spinner.finish();

        let fresh = result.unwrap_or_else(|e| {
            shell.warn(format!("could not clone {}: {:#}", args.url, e));
            RepositoryAnalysis::default()
        });
        decision = resolve_type(&fresh, existing, args.lang);
        analysis = Some(fresh);
    }

    shell.print(format!("type: {}", decision.library_type));
    shell.print(format!("source: {}", decision.source));
    if let Some(analysis) = analysis {
        shell.print(format!("cmake: {}", analysis.has_manifest));
        match analysis.targets {
            Some(_) => shell.print(format!("targets: {}", analysis.main_targets.join(", "))),
            None if analysis.has_manifest => shell.print("targets: (unknown)"),
            None => {}
        }
    }

    Ok(())
}
