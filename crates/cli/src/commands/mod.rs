use std::path::Path;

use anyhow::Context;
use reach_core::{
    acquire::{AcquireProgress, AcquisitionError, ModAcquirer},
    configs::AcquireSettings,
    instance::{Instance, InstanceType, SharedInstance},
};
use reach_modding::{
    crmm::version::{ProjectFile, ProjectVersion, ProjectVersions, ProjectVersionsData},
    Query,
};
use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::{
    args::{Cli, Command},
    error::CliError,
};

use self::ctrl_c::cancel_on_ctrl_c;

mod ctrl_c;

pub async fn process_args(cli: &Cli) -> anyhow::Result<()> {
    let settings = AcquireSettings::load_or_default(&cli.settings).await?;
    let client = Client::new();

    match &cli.command {
        Command::Create {
            name,
            instance_type,
        } => create(&cli.instance, name.as_deref(), *instance_type).await,
        Command::List => list(&cli.instance).await,
        Command::Versions { project } => {
            for version in versions(&client, &settings, project).await? {
                let file = version.primary_file().map_or("-", |f| f.name.as_str());
                println!("{}\t{}\t{}", version.version_number, version.title, file);
            }
            Ok(())
        }
        Command::Install { project, version } => {
            let versions = versions(&client, &settings, project).await?;

            let selected = match version {
                Some(number) => versions
                    .into_iter()
                    .find(|v| &v.version_number == number)
                    .ok_or_else(|| CliError::VersionNotFound {
                        project: project.clone(),
                        version: number.clone(),
                    })?,
                None => versions
                    .into_iter()
                    .next()
                    .ok_or_else(|| CliError::NoVersions(project.clone()))?,
            };

            install(&cli.instance, ModAcquirer::new(client, settings), selected).await
        }
        Command::InstallUrl { url, name, size } => {
            let name = match name {
                Some(name) => name.clone(),
                None => url
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(ToOwned::to_owned)
                    .ok_or_else(|| CliError::NoFileName(url.clone()))?,
            };

            let version = ProjectVersion {
                id: url.clone(),
                title: name.clone(),
                version_number: name.clone(),
                slug: None,
                changelog: None,
                release_channel: None,
                game_versions: Vec::new(),
                loaders: Vec::new(),
                featured: false,
                downloads: 0,
                date_published: None,
                primary_file: Some(ProjectFile::new(name, url.clone(), *size)),
                files: Vec::new(),
            };

            install(&cli.instance, ModAcquirer::new(client, settings), version).await
        }
    }
}

async fn create(dir: &Path, name: Option<&str>, instance_type: InstanceType) -> anyhow::Result<()> {
    if Instance::load(dir).await.is_ok() {
        return Err(CliError::InstanceExists(dir.display().to_string()).into());
    }

    let name = name.map(ToOwned::to_owned).unwrap_or_else(|| {
        dir.file_name()
            .map_or_else(|| "instance".to_owned(), |n| n.to_string_lossy().into_owned())
    });

    let instance = Instance::new(name, instance_type, dir);
    instance.save().await?;

    info!("Created {instance_type} instance {}", instance.name());

    Ok(())
}

async fn list(dir: &Path) -> anyhow::Result<()> {
    let instance = Instance::load(dir).await?;

    println!("{} ({})", instance.name(), instance.instance_type());

    for value in instance.mods() {
        println!(
            "{}\t{}\t{:?}\t{}",
            value.id(),
            value.version().unwrap_or("-"),
            value.loader(),
            if value.is_active() { "active" } else { "inactive" }
        );
    }

    Ok(())
}

async fn versions(client: &Client, settings: &AcquireSettings, project: &str) -> anyhow::Result<Vec<ProjectVersion>> {
    let query = Query::new(ProjectVersionsData::builder().slug(project).build());

    let versions: ProjectVersions = query
        .query_with(client, &settings.catalog_url)
        .await
        .with_context(|| format!("cannot get versions of `{project}`"))?;

    Ok(versions.into_inner())
}

async fn install(dir: &Path, acquirer: ModAcquirer, version: ProjectVersion) -> anyhow::Result<()> {
    let instance = SharedInstance::new(Instance::load(dir).await?);

    let (sender, mut receiver) = tokio::sync::mpsc::channel::<AcquireProgress>(64);
    let handle = acquirer.spawn(version, instance.clone(), sender);
    let _guard = cancel_on_ctrl_c(handle.cancellation_token());

    while let Some(event) = receiver.recv().await {
        render(&event);
    }

    match handle.join().await {
        Ok(Some(value)) => {
            instance.lock().await.save().await?;
            info!("Installed {} into {}", value.id(), dir.display());
            Ok(())
        }
        Ok(None) => {
            let instance_type = instance.lock().await.instance_type();
            warn!("Instances of type {instance_type} do not support mods. Nothing to do");
            Ok(())
        }
        Err(AcquisitionError::Cancelled) => {
            info!("Cancelled");
            Ok(())
        }
        Err(err) => Err(installation_failed(err)),
    }
}

/// Turn a failed acquisition into the command's error, so `reach` exits non-zero.
fn installation_failed(err: AcquisitionError) -> anyhow::Error {
    if !err.is_user_facing() {
        error!("Unexpected error during mod installation");
    }
    err.into()
}

fn render(event: &AcquireProgress) {
    match event {
        AcquireProgress::Started { file, expected } => match expected {
            Some(size) => info!("Downloading {file} ({size} bytes)"),
            None => info!("Downloading {file}"),
        },
        AcquireProgress::Transferred {
            downloaded,
            expected: Some(expected),
        } if *expected > 0 => {
            debug!("{downloaded}/{expected} ({}%)", downloaded * 100 / expected);
        }
        AcquireProgress::Transferred { downloaded, .. } => debug!("{downloaded} bytes"),
        AcquireProgress::Downloaded { total } => info!("Downloaded {total} bytes"),
        AcquireProgress::Finished { id } => debug!("Finished {id}"),
        AcquireProgress::Failed { reason } => debug!("Failed: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_mod_fails_the_command() {
        let err = installation_failed(AcquisitionError::DuplicateMod("examplemod".to_owned()));

        assert!(matches!(
            err.downcast_ref::<AcquisitionError>(),
            Some(AcquisitionError::DuplicateMod(id)) if id == "examplemod"
        ));
        assert_eq!(err.to_string(), "Mod with id 'examplemod' already added!");
    }
}
