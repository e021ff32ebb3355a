use kitchen_game::{
    ActiveBoosters, Attribute, BoosterInventory, BoosterKind, ContentData, CookingConfig,
    CookingSession, FailureCause, Grade, JackpotEffect, Meters, PlayerProgress, ProgressConfig,
    Progression, RecipeBook, SessionEvent, SessionOutcome, SessionPhase, Wallet,
};

fn bundled() -> ContentData {
    ContentData::load_bundled().unwrap()
}

/// Slot whose deltas leave the most headroom below every target maximum.
fn safest_slot(meters: &Meters, rolls: &[kitchen_game::IngredientRoll]) -> usize {
    let headroom = |roll: &kitchen_game::IngredientRoll| {
        Attribute::ALL
            .iter()
            .map(|attr| {
                let meter = meters.get(*attr);
                meter.target_max() - (meter.current() + roll.deltas.get(*attr))
            })
            .fold(f32::INFINITY, f32::min)
    };
    rolls
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| headroom(a).total_cmp(&headroom(b)))
        .map_or(0, |(slot, _)| slot)
}

fn play_round<P, C>(
    session: &mut CookingSession<P, C>,
    effect: JackpotEffect,
) -> Vec<SessionEvent>
where
    P: kitchen_game::ProgressTracker,
    C: kitchen_game::CoinSink,
{
    let mut events = Vec::new();
    for _ in 0..200 {
        match session.phase() {
            SessionPhase::AwaitingJackpotChoice => {
                assert!(session.choose_jackpot_effect(effect));
            }
            SessionPhase::AwaitingShieldTarget => {
                assert!(session.choose_shield_attribute(Attribute::Stability));
            }
            SessionPhase::AwaitingSelection => {
                let slot = safest_slot(session.meters(), session.rolls());
                assert!(session.select_ingredient(slot));
            }
            SessionPhase::Complete => break,
            _ => session.advance(0.5),
        }
        events.extend(session.drain_events());
    }
    events.extend(session.drain_events());
    events
}

#[test]
fn bundled_salad_round_finishes_with_consistent_events() {
    let mut progression = Progression::default();
    let mut wallet = Wallet::default();
    let mut session = CookingSession::new(
        CookingConfig::default(),
        bundled(),
        0x5A1A_D000,
        &mut progression,
        &mut wallet,
    );
    session
        .start_recipe("easy_salad", ActiveBoosters::none())
        .unwrap();
    let events = play_round(&mut session, JackpotEffect::WildMultiplier);
    assert!(session.is_game_over());

    let ended: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::GameEnded { .. }))
        .collect();
    assert_eq!(ended.len(), 1, "exactly one end event");

    let rolls_presented = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::RollsPresented { .. }))
        .count();
    assert!(rolls_presented >= 1);

    let outcome = session.outcome().cloned().unwrap();
    drop(session);
    match outcome {
        SessionOutcome::Served(result) => {
            assert!(result.grade.is_success());
            assert_eq!(wallet.coins, result.final_reward);
            assert_eq!(progression.data().orders_completed, 1);
            assert!(progression.data().total_xp_earned > 0);
        }
        SessionOutcome::Failed { cause, result } => {
            assert_eq!(wallet.coins, 0);
            assert_eq!(progression.data().orders_failed, 1);
            if cause == FailureCause::NoMetersInRange {
                assert_eq!(result.map(|r| r.grade), Some(Grade::Failed));
            }
        }
    }
}

#[test]
fn events_serialize_with_snake_case_tags() {
    let mut session = CookingSession::new(
        CookingConfig::default(),
        bundled(),
        7,
        Progression::default(),
        Wallet::default(),
    );
    session
        .start_recipe("easy_salad", ActiveBoosters::none())
        .unwrap();
    let events = session.drain_events();
    let json = serde_json::to_value(&events).unwrap();
    let tags: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["event"].as_str())
        .collect();
    assert!(tags.contains(&"meter_changed"));
    assert!(tags.contains(&"turn_advanced"));
    assert!(tags.contains(&"rolls_presented"));
}

#[test]
fn locked_recipes_cannot_start_until_level_reached() {
    let content = bundled();
    let book = RecipeBook::new(&content.recipes);
    let locked = book.next_unlockable(1).unwrap().clone();

    let mut session = CookingSession::new(
        CookingConfig::default(),
        content.clone(),
        11,
        Progression::default(),
        Wallet::default(),
    );
    let err = session
        .start_cooking(&locked, ActiveBoosters::none())
        .unwrap_err();
    assert!(err.to_string().contains(&locked.id));
    assert_eq!(session.phase(), SessionPhase::Idle);

    let veteran = PlayerProgress {
        level: locked.unlock_level,
        ..PlayerProgress::default()
    };
    let mut session = CookingSession::new(
        CookingConfig::default(),
        content,
        11,
        Progression::new(ProgressConfig::default(), veteran),
        Wallet::default(),
    );
    session
        .start_cooking(&locked, ActiveBoosters::none())
        .unwrap();
    assert!(session.phase().is_running());
}

#[test]
fn boosters_flow_from_inventory_into_a_round() {
    let mut inventory = BoosterInventory::default();
    inventory.add(BoosterKind::ExtraTurn, 1);
    inventory.add(BoosterKind::Shield, 1);
    let mut active = ActiveBoosters::none();
    assert!(inventory.activate_for_game(BoosterKind::ExtraTurn, None, &mut active));
    assert!(inventory.activate_for_game(
        BoosterKind::Shield,
        Some(Attribute::Magic),
        &mut active
    ));

    let content = bundled();
    let salad_turns = content.recipe("easy_salad").unwrap().total_turns;
    let mut session = CookingSession::new(
        CookingConfig::default(),
        content,
        99,
        Progression::default(),
        Wallet::default(),
    );
    session.start_recipe("easy_salad", active).unwrap();
    assert_eq!(session.turns_remaining(), salad_turns + 1);
    assert_eq!(session.shield().protected(), Some(Attribute::Magic));
    let events = session.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::ShieldArmed {
            attribute: Attribute::Magic
        }
    )));
    assert_eq!(inventory.count(BoosterKind::ExtraTurn), 0);
}

#[test]
fn repeated_orders_accumulate_progress_through_borrowed_trackers() {
    let mut progression = Progression::default();
    let mut wallet = Wallet::default();
    for seed in 0..6_u64 {
        let mut session = CookingSession::new(
            CookingConfig::default(),
            bundled(),
            seed,
            &mut progression,
            &mut wallet,
        );
        session
            .start_recipe("easy_salad", ActiveBoosters::none())
            .unwrap();
        play_round(&mut session, JackpotEffect::MeterBoost);
        assert!(session.is_game_over());
    }
    let data = progression.data();
    assert_eq!(data.total_orders(), 6);
    assert!(data.highest_streak >= data.current_streak);
    assert!(data.level >= 1);
    if data.orders_completed > 0 {
        assert!(wallet.coins > 0);
    }
}

#[test]
fn serving_early_after_one_turn_ends_the_round() {
    let mut cfg = CookingConfig::default();
    cfg.roll_delay_secs = 0.0;
    let mut session =
        CookingSession::new(cfg, bundled(), 3, Progression::default(), Wallet::default());
    session
        .start_recipe("easy_salad", ActiveBoosters::none())
        .unwrap();
    assert!(!session.can_serve_early());
    if session.phase() == SessionPhase::AwaitingJackpotChoice {
        assert!(session.choose_jackpot_effect(JackpotEffect::WildMultiplier));
    }
    let slot = safest_slot(session.meters(), session.rolls());
    assert!(session.select_ingredient(slot));
    if session.is_game_over() {
        return;
    }
    assert!(session.can_serve_early());
    let preview = session.potential_reward().unwrap();
    assert!(session.serve_early());
    assert!(session.served_early());
    assert!(session.is_game_over());
    let outcome = session.outcome().unwrap();
    match outcome {
        SessionOutcome::Served(result) => assert_eq!(*result, preview),
        SessionOutcome::Failed { result, .. } => assert_eq!(result.as_ref(), Some(&preview)),
    }
    assert!(!session.serve_early());
}
