//! Renders a recorded event log through `tracing`.
//!
//! Events about one combatant are replayed inside that combatant's span;
//! squad-wide events (burst stages, cooldown reductions) go to a `squad`
//! span. Per-shot traffic logs at `debug`, milestones at `info`.

use sim_core::combatant::{Combatant, CombatantId};
use sim_core::events::{EventRecord, Recipient, SimEvent};
use tracing::{debug, info, info_span};

pub fn replay(records: &[EventRecord], roster: &[Combatant]) {
    {
        let span = info_span!("squad");
        let _enter = span.enter();
        for record in records.iter().filter(|r| r.event.combatant().is_none()) {
            log_event(record, roster);
        }
    }

    for combatant in roster {
        let span = info_span!("combatant", combatant = %combatant.name());
        let _enter = span.enter();
        let id = Some(combatant.id());
        for record in records.iter().filter(|r| r.event.combatant() == id) {
            log_event(record, roster);
        }
    }
}

fn name(roster: &[Combatant], id: CombatantId) -> &str {
    roster.get(id.index()).map_or("?", Combatant::name)
}

fn recipient<'a>(roster: &'a [Combatant], recipient: &Recipient) -> &'a str {
    match recipient {
        Recipient::Combatant(id) => name(roster, *id),
        Recipient::Enemy => "enemy",
    }
}

fn log_event(record: &EventRecord, roster: &[Combatant]) {
    let frame = record.frame;
    match &record.event {
        SimEvent::ShotFired {
            pellets,
            damage,
            hits,
            crits,
            cores,
            ammo,
            max_ammo,
            ..
        } => debug!(
            frame,
            pellets, hits, crits, cores, ammo, max_ammo, "shot for {damage:.0}"
        ),
        SimEvent::ReloadStarted { frames, .. } => debug!(frame, frames, "reload"),
        SimEvent::ReloadComplete { .. } => debug!(frame, "reloaded"),
        SimEvent::AmmoChanged { ammo, .. } => debug!(frame, ammo, "ammo set"),
        SimEvent::StackChanged {
            recipient: who,
            stack,
            count,
        } => debug!(frame, stack = %stack, count, on = recipient(roster, who), "stack"),
        SimEvent::DotTick {
            name, stacks, damage, ..
        } => debug!(frame, dot = %name, stacks, "tick for {damage:.0}"),
        SimEvent::WeaponSwapped {
            weapon,
            ammo,
            max_ammo,
            ..
        } => info!(frame, weapon = %weapon, ammo, max_ammo, "weapon swapped"),
        SimEvent::WeaponReverted { ammo, max_ammo, .. } => {
            info!(frame, ammo, max_ammo, "weapon reverted")
        }
        SimEvent::SkillActivated { skill, .. } => info!(frame, skill = %skill, "skill"),
        SimEvent::BuffApplied {
            recipient: who,
            skill,
            modifier,
            value,
            frames,
            ..
        } => info!(
            frame,
            skill = %skill,
            modifier = %modifier,
            value,
            frames,
            on = recipient(roster, who),
            "buff"
        ),
        SimEvent::DebuffBlocked { target, skill, .. } => info!(
            frame,
            skill = %skill,
            against = name(roster, *target),
            "debuff blocked by immunity"
        ),
        SimEvent::TagsRemoved {
            recipient: who,
            tag,
            removed,
        } => info!(frame, tag = %tag, removed, on = recipient(roster, who), "tags removed"),
        SimEvent::FlagActivated { flag, .. } => info!(frame, flag = %flag, "flag"),
        SimEvent::SkillDamage {
            skill, damage, hits, ..
        } => info!(frame, skill = %skill, hits, "skill damage {damage:.0}"),
        SimEvent::DotApplied {
            name, stacks, until, ..
        } => info!(frame, dot = %name, stacks, until, "dot applied"),
        SimEvent::HealApplied {
            source,
            amount,
            actual,
            hp,
            distributed,
            ..
        } => info!(
            frame,
            source = %source,
            amount,
            actual,
            hp,
            distributed,
            "heal"
        ),
        SimEvent::CooldownsReduced { frames } => info!(frame, frames, "cooldowns reduced"),
        SimEvent::ActionScheduled { skill, due, .. } => {
            info!(frame, skill = %skill, due, "action scheduled")
        }
        SimEvent::BurstStageEntered { stage } => info!(frame, "burst stage {stage} open"),
        SimEvent::BurstActivated { stage, .. } => info!(frame, "burst {stage}"),
        SimEvent::FullBurstStarted { frames } => info!(frame, frames, "full burst"),
        SimEvent::FullBurstEnded => info!(frame, "full burst ended"),
    }
}
