//! Tests for the individual behavior state policies.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::ai::machine::{AgentState, StateKind};
    use crate::ai::states::testing::CtxBed;
    use crate::ai::states::*;
    use crate::components::Archetype;

    const TICK: f32 = 1.0 / 60.0;

    fn enemy() -> Entity {
        Entity::from_raw(9)
    }

    #[test]
    fn test_idle_noise_starts_investigation() {
        let mut bed = CtxBed::new(Archetype::Aggressive);
        let mut idle = IdleState::default();

        let mut ctx = bed.ctx();
        idle.enter(&mut ctx);
        idle.on_noise_heard(&mut ctx, Vec3::new(4.0, 0.0, 0.0), 0.8);

        assert_eq!(ctx.requested, Some(StateKind::Investigate));
        assert_eq!(ctx.facts.investigation_point, Some(Vec3::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_idle_dwell_expires_into_patrol() {
        let mut bed = CtxBed::new(Archetype::Aggressive);
        let mut idle = IdleState::default();

        let mut ctx = bed.ctx();
        idle.enter(&mut ctx);
        // Dwell is rolled in [2,5]s; 5.1s always exhausts it.
        idle.update(&mut ctx, 5.1);

        assert_eq!(ctx.requested, Some(StateKind::Patrol));
    }

    #[test]
    fn test_detection_routes_by_archetype() {
        for (archetype, expected) in [
            (Archetype::Flee, StateKind::Flee),
            (Archetype::Stalker, StateKind::Stalk),
            (Archetype::Aggressive, StateKind::Chase),
        ] {
            let mut bed = CtxBed::new(archetype);
            let mut idle = IdleState::default();

            let mut ctx = bed.ctx();
            idle.enter(&mut ctx);
            idle.on_target_spotted(&mut ctx, enemy(), Vec3::new(3.0, 0.0, 0.0));

            assert_eq!(ctx.requested, Some(expected));
            assert_eq!(ctx.facts.target, Some(enemy()));
        }
    }

    #[test]
    fn test_chase_lost_sight_timer_resets_on_resight() {
        let mut bed = CtxBed::new(Archetype::Aggressive);
        bed.facts.target = Some(enemy());
        bed.facts.target_position = Vec3::new(20.0, 0.0, 0.0);
        bed.facts.target_visible = false;
        let mut chase = ChaseState::default();

        {
            let mut ctx = bed.ctx();
            chase.enter(&mut ctx);
            chase.update(&mut ctx, 4.9);
            assert_eq!(ctx.requested, None);

            // Regaining sight at 4.9s resets the timer to zero.
            chase.on_target_spotted(&mut ctx, enemy(), Vec3::new(20.0, 0.0, 0.0));
        }

        bed.facts.target_visible = false;
        let mut ctx = bed.ctx();
        chase.update(&mut ctx, 4.9);
        assert_eq!(ctx.requested, None);
        chase.update(&mut ctx, 0.2);
        assert_eq!(ctx.requested, Some(StateKind::Investigate));
        assert_eq!(
            ctx.facts.investigation_point,
            Some(Vec3::new(20.0, 0.0, 0.0))
        );
    }

    #[test]
    fn test_chase_hands_off_to_attack_in_range() {
        let mut bed = CtxBed::new(Archetype::Aggressive);
        bed.facts.target = Some(enemy());
        bed.facts.target_position = Vec3::new(1.5, 0.0, 0.0);
        bed.facts.target_visible = true;
        let mut chase = ChaseState::default();

        let mut ctx = bed.ctx();
        chase.enter(&mut ctx);
        chase.update(&mut ctx, TICK);

        assert_eq!(ctx.requested, Some(StateKind::Attack));
    }

    #[test]
    fn test_attack_disengages_strictly_beyond_range_slack() {
        let mut bed = CtxBed::new(Archetype::Aggressive);
        bed.facts.target = Some(enemy());
        bed.facts.target_visible = true;
        let mut attack = AttackState::default();

        // attack_range 2.0, slack 1.2: exactly 2.4 away stays in Attack.
        bed.facts.target_position = Vec3::new(2.0 * 1.2, 0.0, 0.0);
        {
            let mut ctx = bed.ctx();
            attack.enter(&mut ctx);
            attack.update(&mut ctx, TICK);
            assert_ne!(ctx.requested, Some(StateKind::Chase));
        }

        // One step past the slack boundary disengages to Chase.
        bed.facts.target_position = Vec3::new(2.0 * 1.21, 0.0, 0.0);
        let mut ctx = bed.ctx();
        attack.update(&mut ctx, TICK);
        assert_eq!(ctx.requested, Some(StateKind::Chase));
    }

    #[test]
    fn test_attack_commits_one_strike_then_disengages() {
        let mut bed = CtxBed::new(Archetype::Aggressive);
        bed.facts.target = Some(enemy());
        bed.facts.target_position = Vec3::new(1.0, 0.0, 0.0);
        bed.facts.target_visible = true;
        let mut attack = AttackState::default();

        {
            let mut ctx = bed.ctx();
            attack.enter(&mut ctx);
            attack.update(&mut ctx, TICK);
            assert!(ctx.facts.attack_in_progress);
            assert_eq!(ctx.requested, None);
        }

        // Swing finishes; the next tick falls back to pursuit.
        bed.facts.attack_in_progress = false;
        bed.facts.swing = None;
        {
            let mut ctx = bed.ctx();
            attack.update(&mut ctx, TICK);
            assert_eq!(ctx.requested, Some(StateKind::Chase));
        }

        // Re-entering resets the commitment so a second strike can land.
        bed.facts.next_attack_at = 0.0;
        let mut ctx = bed.ctx();
        attack.enter(&mut ctx);
        attack.update(&mut ctx, TICK);
        assert!(ctx.facts.attack_in_progress);
    }

    #[test]
    fn test_stalker_bails_to_stalk_while_on_cooldown() {
        let mut bed = CtxBed::new(Archetype::Stalker);
        bed.facts.target = Some(enemy());
        bed.facts.target_position = Vec3::new(1.0, 0.0, 0.0);
        bed.facts.target_visible = true;
        bed.facts.next_attack_at = 10.0;
        let mut attack = AttackState::default();

        let mut ctx = bed.ctx();
        attack.enter(&mut ctx);
        attack.update(&mut ctx, TICK);

        assert_eq!(ctx.requested, Some(StateKind::Stalk));
        assert!(!ctx.facts.attack_in_progress);
    }

    #[test]
    fn test_attack_without_target_self_heals_to_investigate() {
        let mut bed = CtxBed::new(Archetype::Aggressive);
        let mut attack = AttackState::default();

        let mut ctx = bed.ctx();
        attack.enter(&mut ctx);
        attack.update(&mut ctx, TICK);

        assert_eq!(ctx.requested, Some(StateKind::Investigate));
    }

    #[test]
    fn test_stalk_approaches_when_beyond_band() {
        let mut bed = CtxBed::new(Archetype::Stalker);
        bed.facts.target = Some(enemy());
        bed.facts.target_position = Vec3::new(12.0, 0.0, 0.0);
        bed.facts.target_visible = true;
        let mut stalk = StalkState::default();

        let mut ctx = bed.ctx();
        stalk.enter(&mut ctx);
        stalk.update(&mut ctx, TICK);

        assert!(ctx.nav.has_pending_path());
        assert_eq!(ctx.requested, None);
    }

    #[test]
    fn test_stalk_lunges_once_delay_and_cooldown_clear() {
        let mut bed = CtxBed::new(Archetype::Stalker);
        bed.facts.target = Some(enemy());
        bed.facts.target_position = Vec3::new(1.0, 0.0, 0.0);
        bed.facts.target_visible = true;
        let mut stalk = StalkState::default();

        let mut ctx = bed.ctx();
        stalk.enter(&mut ctx);
        // First-strike delay is at most 2.0s; 2.5s elapsed clears it.
        stalk.update(&mut ctx, 2.5);

        assert_eq!(ctx.requested, Some(StateKind::Attack));
    }

    #[test]
    fn test_stalk_lost_sight_degrades_to_investigate() {
        let mut bed = CtxBed::new(Archetype::Stalker);
        bed.facts.target = Some(enemy());
        bed.facts.target_position = Vec3::new(7.0, 0.0, 0.0);
        bed.facts.target_visible = false;
        // Keep the cooldown far out so the lunge path stays closed.
        bed.facts.next_attack_at = 100.0;
        let mut stalk = StalkState::default();

        let mut ctx = bed.ctx();
        stalk.enter(&mut ctx);
        stalk.update(&mut ctx, 5.9);
        assert_eq!(ctx.requested, None);
        stalk.update(&mut ctx, 0.2);

        assert_eq!(ctx.requested, Some(StateKind::Investigate));
    }

    #[test]
    fn test_flee_needs_min_duration_and_sight_grace() {
        let mut bed = CtxBed::new(Archetype::Flee);
        bed.facts.target = Some(enemy());
        bed.facts.target_position = Vec3::new(5.0, 0.0, 0.0);
        bed.facts.target_visible = false;
        let mut flee = FleeState::default();

        let mut ctx = bed.ctx();
        flee.enter(&mut ctx);

        // 4.9s elapsed: minimum duration not met.
        flee.update(&mut ctx, 4.9);
        assert_eq!(ctx.requested, None);

        // Past 5s with 2.5s of lost sight already banked: escape complete.
        flee.update(&mut ctx, 0.2);
        assert_eq!(ctx.requested, Some(StateKind::Patrol));
    }

    #[test]
    fn test_flee_hard_cap_overrides_sight() {
        let mut bed = CtxBed::new(Archetype::Flee);
        bed.facts.target = Some(enemy());
        bed.facts.target_position = Vec3::new(5.0, 0.0, 0.0);
        bed.facts.target_visible = true;
        let mut flee = FleeState::default();

        let mut ctx = bed.ctx();
        flee.enter(&mut ctx);
        for _ in 0..8 {
            flee.update(&mut ctx, 1.5);
            if ctx.requested.is_some() {
                break;
            }
        }

        assert_eq!(ctx.requested, Some(StateKind::Patrol));
    }

    #[test]
    fn test_returning_to_patrol_clears_alert_and_rearms_notices() {
        let mut bed = CtxBed::new(Archetype::Flee);
        bed.facts.target = Some(enemy());
        bed.facts.target_position = Vec3::new(5.0, 0.0, 0.0);
        let mut flee = FleeState::default();
        let mut patrol = PatrolState::default();
        let mut chase = ChaseState::default();

        let mut ctx = bed.ctx();
        flee.enter(&mut ctx);
        assert!(ctx.facts.alerted);
        assert_eq!(ctx.alerts.len(), 1);

        flee.exit(&mut ctx);
        patrol.enter(&mut ctx);
        assert!(!ctx.facts.alerted);

        // A fresh engagement is a new rising edge and must notify again.
        ctx.facts.target = Some(enemy());
        ctx.facts.target_position = Vec3::new(3.0, 0.0, 0.0);
        ctx.facts.target_visible = true;
        chase.enter(&mut ctx);
        assert!(ctx.facts.alerted);
        assert_eq!(ctx.alerts.len(), 2);
    }

    #[test]
    fn test_stunned_recovery_routes_per_archetype() {
        // Aggressive with a visible target resumes the chase.
        let mut bed = CtxBed::new(Archetype::Aggressive);
        bed.facts.target = Some(enemy());
        bed.facts.target_visible = true;
        bed.facts.pending_stun = Some(2.0);
        let mut stunned = StunnedState::default();
        {
            let mut ctx = bed.ctx();
            stunned.enter(&mut ctx);
            assert!(ctx.facts.stunned);
            stunned.update(&mut ctx, 1.9);
            assert_eq!(ctx.requested, None);
            stunned.update(&mut ctx, 0.2);
            assert_eq!(ctx.requested, Some(StateKind::Chase));
            stunned.exit(&mut ctx);
            assert!(!ctx.facts.stunned);
        }

        // Flee archetype always runs, target or not.
        let mut bed = CtxBed::new(Archetype::Flee);
        bed.facts.pending_stun = Some(0.5);
        let mut stunned = StunnedState::default();
        {
            let mut ctx = bed.ctx();
            stunned.enter(&mut ctx);
            stunned.update(&mut ctx, 0.6);
            assert_eq!(ctx.requested, Some(StateKind::Flee));
        }

        // No target left: back to the patrol loop.
        let mut bed = CtxBed::new(Archetype::Aggressive);
        bed.facts.pending_stun = Some(0.5);
        let mut stunned = StunnedState::default();
        let mut ctx = bed.ctx();
        stunned.enter(&mut ctx);
        stunned.update(&mut ctx, 0.6);
        assert_eq!(ctx.requested, Some(StateKind::Patrol));
    }

    #[test]
    fn test_investigate_renewed_noise_resets_timeout() {
        let mut bed = CtxBed::new(Archetype::Aggressive);
        bed.facts.investigation_point = Some(Vec3::new(6.0, 0.0, 0.0));
        let mut investigate = InvestigateState::default();

        let mut ctx = bed.ctx();
        investigate.enter(&mut ctx);
        investigate.update(&mut ctx, 9.0);
        assert_eq!(ctx.requested, None);

        // A fresh noise re-arms the clock; 9s more still does not expire.
        investigate.on_noise_heard(&mut ctx, Vec3::new(8.0, 0.0, 0.0), 0.6);
        investigate.update(&mut ctx, 9.0);
        assert_eq!(ctx.requested, None);

        investigate.update(&mut ctx, 1.1);
        assert_eq!(ctx.requested, Some(StateKind::Patrol));
    }

    #[test]
    fn test_patrol_clears_target_on_entry() {
        let mut bed = CtxBed::new(Archetype::Aggressive);
        bed.facts.target = Some(enemy());
        bed.facts.target_visible = true;
        let mut patrol = PatrolState::default();

        let mut ctx = bed.ctx();
        patrol.enter(&mut ctx);

        assert_eq!(ctx.facts.target, None);
        assert!(!ctx.facts.target_visible);
    }
}
