//! Handlers for the registration commands.

use crate::adapter::inbound::cli::command::{AddArgs, GroupArgs, ListArgs, RemoveArgs};
use crate::adapter::inbound::cli::output;
use crate::application::{AllowListChange, Registrar};
use crate::domain::{Destination, GroupId};
use crate::error::Result;

pub async fn add(registrar: &Registrar, args: AddArgs) -> Result<()> {
    let group = GroupId::new(args.group);
    let registration = registrar
        .add(
            &group,
            args.kind.into(),
            &args.link,
            Destination::new(args.destination),
        )
        .await?;

    output::success(&format!(
        "Now tracking {} for group {}",
        output::highlight(&registration.entity),
        group
    ));
    output::field("Known events", registration.seeded_events);
    if let Some(previous) = registration.replaced {
        output::note(&format!("Replaced previous destination {previous}"));
    }
    Ok(())
}

pub async fn remove(registrar: &Registrar, args: RemoveArgs) -> Result<()> {
    let group = GroupId::new(args.group);
    let entity = registrar
        .remove(&group, args.kind.into(), &args.link, args.purge)
        .await?;

    output::success(&format!(
        "Stopped tracking {} for group {}",
        output::highlight(&entity),
        group
    ));
    Ok(())
}

pub fn allow(registrar: &Registrar, args: GroupArgs) -> Result<()> {
    let group = GroupId::new(args.group);
    match registrar.allow(&group)? {
        AllowListChange::AlreadyAllowed => {
            output::note(&format!("Group {group} was already allowed"));
        }
        _ => output::success(&format!("Group {group} can now register trackers")),
    }
    Ok(())
}

pub fn disallow(registrar: &Registrar, args: GroupArgs) -> Result<()> {
    let group = GroupId::new(args.group);
    match registrar.disallow(&group)? {
        AllowListChange::NotAllowed => {
            output::note(&format!("Group {group} was not allowed"));
        }
        _ => output::success(&format!("Group {group} can no longer register trackers")),
    }
    Ok(())
}

pub fn list(registrar: &Registrar, args: ListArgs) -> Result<()> {
    let group = args.group.map(GroupId::new);
    let tracked = registrar.tracked(group.as_ref())?;

    output::section("Tracked");
    if tracked.is_empty() {
        output::note("Nothing is tracked");
    }
    for summary in &tracked {
        output::field(
            &summary.entity.to_string(),
            format!(
                "{} listener(s), {} known event(s)",
                summary.listeners, summary.history_len
            ),
        );
    }

    if group.is_none() {
        let groups = registrar.allowed_groups()?;
        output::section("Allowed groups");
        if groups.is_empty() {
            output::note("No group is allowed");
        }
        for group in groups {
            output::note(group.as_str());
        }
    }
    Ok(())
}
