use draftban::room::{Command, MAP_NAMES, Room, TEAM_SIZE};
use draftban::types::{Phase, SessionId};

fn seated_room(seed: u64, names: &[&str]) -> (Room, Vec<SessionId>) {
    let mut room = Room::with_seed(seed);
    let ids: Vec<SessionId> = (0..names.len())
        .map(|i| SessionId::from(format!("session-{i}").as_str()))
        .collect();
    for (id, name) in ids.iter().zip(names) {
        room.apply(id, Command::ClaimSeat(name.to_string())).unwrap();
    }
    (room, ids)
}

const TEN: [&str; 10] = [
    "Phoenix", "Sage", "Jett", "Omen", "Sova", "Viper", "Cypher", "Reyna", "Killjoy", "Breach",
];

#[test]
fn ten_players_draft_then_ban_to_one_map() {
    let (mut room, ids) = seated_room(11, &TEN);
    room.apply(&ids[0], Command::BecomeCaptain).unwrap();
    assert_eq!(room.phase(), Phase::Lobby);
    room.apply(&ids[1], Command::BecomeCaptain).unwrap();
    assert_eq!(room.phase(), Phase::Drafting);
    assert_eq!(room.teams(), &[vec![ids[0].clone()], vec![ids[1].clone()]]);

    let [first, second] = room.draft_order().unwrap().clone();
    for (n, target) in ids[2..].iter().enumerate() {
        let captain = if n % 2 == 0 { &first } else { &second };
        room.apply(captain, Command::DraftPick(target.clone())).unwrap();
    }
    assert_eq!(room.phase(), Phase::MapBanning);
    assert!(room.teams().iter().all(|t| t.len() == TEAM_SIZE));
    assert_eq!(room.ban_order(), Some(&[second.clone(), first.clone()]));

    for (n, map) in MAP_NAMES.iter().take(MAP_NAMES.len() - 1).enumerate() {
        let banner = if n % 2 == 0 { &second } else { &first };
        room.apply(banner, Command::BanMap(map.to_string())).unwrap();
    }
    assert_eq!(room.remaining_maps().count(), 1);
    assert_eq!(room.current_banner(), None);
    assert_eq!(room.selected_map(), Some(MAP_NAMES[MAP_NAMES.len() - 1]));
}

#[test]
fn captain_drop_during_draft_returns_to_lobby() {
    let (mut room, ids) = seated_room(5, &TEN);
    room.apply(&ids[0], Command::BecomeCaptain).unwrap();
    room.apply(&ids[1], Command::BecomeCaptain).unwrap();

    room.apply(&ids[0], Command::Disconnect).unwrap();

    assert_eq!(room.phase(), Phase::Lobby);
    assert!(room.teams().iter().all(Vec::is_empty));
    assert!(room.maps().iter().all(|m| !m.banned));
    assert_eq!(room.roster().len(), TEN.len());

    // The dropped captain comes back and steps up again.
    let back = SessionId::from("reconnected");
    room.apply(&back, Command::ClaimSeat("phoenix".to_string())).unwrap();
    room.apply(&back, Command::BecomeCaptain).unwrap();
    assert_eq!(room.phase(), Phase::Drafting);
}

#[test]
fn asura_pick_hands_two_picks_to_other_captain() {
    let mut names = TEN;
    names[4] = " ASURA ";
    let (mut room, ids) = seated_room(2, &names);
    room.apply(&ids[0], Command::BecomeCaptain).unwrap();
    room.apply(&ids[1], Command::BecomeCaptain).unwrap();
    let [first, second] = room.draft_order().unwrap().clone();

    room.apply(&first, Command::DraftPick(ids[2].clone())).unwrap();
    room.apply(&second, Command::DraftPick(ids[4].clone())).unwrap();

    assert_eq!(room.current_picker(), Some(&first));
    room.apply(&first, Command::DraftPick(ids[3].clone())).unwrap();
    assert_eq!(room.current_picker(), Some(&first));
    room.apply(&first, Command::DraftPick(ids[5].clone())).unwrap();
    assert_eq!(room.current_picker(), Some(&second));
}

#[test]
fn proxy_seats_count_towards_the_roster() {
    let (mut room, ids) = seated_room(9, &TEN[..8]);
    let host = &ids[0];
    room.apply(host, Command::ClaimSeatOnBehalf("Raze".to_string())).unwrap();
    room.apply(host, Command::ClaimSeatOnBehalf("Skye".to_string())).unwrap();
    room.apply(&ids[0], Command::BecomeCaptain).unwrap();
    room.apply(&ids[1], Command::BecomeCaptain).unwrap();

    assert_eq!(room.phase(), Phase::Drafting);
    assert_eq!(room.roster().iter().filter(|p| p.id.is_synthetic()).count(), 2);
}
