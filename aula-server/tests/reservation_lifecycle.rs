mod common;

use aula_server::ReservationError;
use aula_server::db::repository as repo;
use common::{at, day, seed_room, seed_user, setup};
use shared::models::{
    AuditAction, AuditQuery, ReservationCreate, ReservationStatus, ReservationUpdate, Role,
    RoomState,
};

fn booking(room_id: i64, start: (u32, u32), end: (u32, u32)) -> ReservationCreate {
    ReservationCreate {
        room_id,
        date: day(2030, 3, 4),
        start_time: at(start.0, start.1),
        end_time: at(end.0, end.1),
        whatsapp_group: None,
    }
}

#[tokio::test]
async fn create_occupies_room_and_notifies_owner() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let room = seed_room(&ctx.state, "A-101").await;

    let mut input = booking(room.id, (9, 0), (10, 0));
    input.whatsapp_group = Some("https://chat.whatsapp.com/grupo".into());
    let outcome = ctx.state.reservations.create(&ana, input).await.unwrap();

    assert_eq!(outcome.reservation.status, ReservationStatus::Active);
    assert_eq!(outcome.reservation.user_id, ana.id);
    assert!(outcome.whatsapp_link.starts_with("https://wa.me/?text="));

    let room = repo::room::find_by_id(&ctx.state.pool, room.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(room.state, RoomState::Occupied);
    assert_eq!(room.occupied_by, Some(ana.id));

    let mails = ctx.mails.wait_for(1).await;
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].to, "ana@aulas.test");
    assert_eq!(mails[0].subject, "Confirmación de Reserva - A-101");
    assert!(mails[0].body.contains("https://chat.whatsapp.com/grupo"));

    let entries = ctx
        .state
        .audit_service
        .query(&AuditQuery {
            entity: Some("reservations".into()),
            limit: 10,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Create);
    assert_eq!(entries[0].entity_id, Some(outcome.reservation.id));
    assert_eq!(entries[0].user_id, Some(ana.id));
}

#[tokio::test]
async fn overlapping_booking_is_rejected_but_back_to_back_is_fine() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let luis = seed_user(&ctx.state, "Luis", "luis@aulas.test", Role::User).await;
    let room = seed_room(&ctx.state, "A-101").await;

    ctx.state
        .reservations
        .create(&ana, booking(room.id, (9, 0), (10, 0)))
        .await
        .unwrap();

    let err = ctx
        .state
        .reservations
        .create(&luis, booking(room.id, (9, 30), (10, 30)))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Conflict));

    let err = ctx
        .state
        .reservations
        .create(&luis, booking(room.id, (8, 0), (11, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Conflict));

    // [10:00, 11:00) touches [09:00, 10:00) without overlapping
    ctx.state
        .reservations
        .create(&luis, booking(room.id, (10, 0), (11, 0)))
        .await
        .unwrap();

    // Same slot in another room is independent
    let other = seed_room(&ctx.state, "B-202").await;
    ctx.state
        .reservations
        .create(&luis, booking(other.id, (9, 0), (10, 0)))
        .await
        .unwrap();
}

#[tokio::test]
async fn time_range_is_checked_before_room_existence() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;

    let err = ctx
        .state
        .reservations
        .create(&ana, booking(9999, (10, 0), (10, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::InvalidTimeRange));

    let err = ctx
        .state
        .reservations
        .create(&ana, booking(9999, (10, 0), (11, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::RoomNotFound(9999)));
}

#[tokio::test]
async fn cancel_frees_room_only_when_no_active_reservation_remains() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let room = seed_room(&ctx.state, "A-101").await;

    let first = ctx
        .state
        .reservations
        .create(&ana, booking(room.id, (9, 0), (10, 0)))
        .await
        .unwrap()
        .reservation;
    let second = ctx
        .state
        .reservations
        .create(&ana, booking(room.id, (12, 0), (13, 0)))
        .await
        .unwrap()
        .reservation;

    let outcome = ctx.state.reservations.cancel(first.id, &ana).await.unwrap();
    assert_eq!(outcome.reservation.status, ReservationStatus::Cancelled);
    let state = repo::room::find_by_id(&ctx.state.pool, room.id)
        .await
        .unwrap()
        .unwrap()
        .state;
    assert_eq!(state, RoomState::Occupied);

    ctx.state.reservations.cancel(second.id, &ana).await.unwrap();
    let room = repo::room::find_by_id(&ctx.state.pool, room.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(room.state, RoomState::Free);
    assert_eq!(room.occupied_by, None);

    let subjects = {
        ctx.mails.wait_for(4).await;
        ctx.mails.subjects()
    };
    assert_eq!(
        subjects
            .iter()
            .filter(|s| s.starts_with("Reserva Cancelada"))
            .count(),
        2
    );

    // The cancelled slot is bookable again
    ctx.state
        .reservations
        .create(&ana, booking(room.id, (9, 0), (10, 0)))
        .await
        .unwrap();
}

#[tokio::test]
async fn cancel_hands_room_to_remaining_reservation_owner() {
    let ctx = setup().await;
    let ben = seed_user(&ctx.state, "Ben", "ben@aulas.test", Role::User).await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let room = seed_room(&ctx.state, "A-101").await;

    ctx.state
        .reservations
        .create(&ben, booking(room.id, (9, 0), (10, 0)))
        .await
        .unwrap();
    let anas = ctx
        .state
        .reservations
        .create(&ana, booking(room.id, (11, 0), (12, 0)))
        .await
        .unwrap()
        .reservation;

    ctx.state.reservations.cancel(anas.id, &ana).await.unwrap();

    let room = repo::room::find_by_id(&ctx.state.pool, room.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(room.state, RoomState::Occupied);
    assert_eq!(room.occupied_by, Some(ben.id));
}

#[tokio::test]
async fn deleting_a_user_keeps_rooms_others_still_booked() {
    let ctx = setup().await;
    let ben = seed_user(&ctx.state, "Ben", "ben@aulas.test", Role::User).await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let shared_room = seed_room(&ctx.state, "A-101").await;
    let own_room = seed_room(&ctx.state, "B-202").await;

    ctx.state
        .reservations
        .create(&ben, booking(shared_room.id, (9, 0), (10, 0)))
        .await
        .unwrap();
    ctx.state
        .reservations
        .create(&ana, booking(shared_room.id, (11, 0), (12, 0)))
        .await
        .unwrap();
    ctx.state
        .reservations
        .create(&ana, booking(own_room.id, (9, 0), (10, 0)))
        .await
        .unwrap();

    assert!(ctx.state.reservations.remove_user(ana.id).await.unwrap());

    let active = repo::reservation::count_active_for_room(&ctx.state.pool, shared_room.id)
        .await
        .unwrap();
    assert_eq!(active, 1);
    let room = repo::room::find_by_id(&ctx.state.pool, shared_room.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(room.state, RoomState::Occupied);
    assert_eq!(room.occupied_by, Some(ben.id));

    // Ana's only booking there went with her account
    let room = repo::room::find_by_id(&ctx.state.pool, own_room.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(room.state, RoomState::Free);
    assert_eq!(room.occupied_by, None);

    // Unknown id: nothing deleted, nothing touched
    assert!(!ctx.state.reservations.remove_user(ana.id).await.unwrap());
}

#[tokio::test]
async fn only_owner_or_admin_may_cancel() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let luis = seed_user(&ctx.state, "Luis", "luis@aulas.test", Role::User).await;
    let admin = seed_user(&ctx.state, "Admin", "admin@aulas.test", Role::Admin).await;
    let room = seed_room(&ctx.state, "A-101").await;

    let r = ctx
        .state
        .reservations
        .create(&ana, booking(room.id, (9, 0), (10, 0)))
        .await
        .unwrap()
        .reservation;

    let err = ctx.state.reservations.cancel(r.id, &luis).await.unwrap_err();
    assert!(matches!(err, ReservationError::NotOwner));

    ctx.state.reservations.cancel(r.id, &admin).await.unwrap();

    let err = ctx.state.reservations.cancel(r.id, &admin).await.unwrap_err();
    assert!(matches!(
        err,
        ReservationError::Finalized {
            status: ReservationStatus::Cancelled,
            ..
        }
    ));

    let err = ctx.state.reservations.cancel(424242, &admin).await.unwrap_err();
    assert!(matches!(err, ReservationError::NotFound(424242)));
}

#[tokio::test]
async fn complete_requires_admin_and_releases_room() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let admin = seed_user(&ctx.state, "Admin", "admin@aulas.test", Role::Admin).await;
    let room = seed_room(&ctx.state, "A-101").await;

    let first = ctx
        .state
        .reservations
        .create(&ana, booking(room.id, (9, 0), (10, 0)))
        .await
        .unwrap()
        .reservation;
    ctx.state
        .reservations
        .create(&ana, booking(room.id, (11, 0), (12, 0)))
        .await
        .unwrap();

    let err = ctx.state.reservations.complete(first.id, &ana).await.unwrap_err();
    assert!(matches!(err, ReservationError::AdminRequired));

    let done = ctx.state.reservations.complete(first.id, &admin).await.unwrap();
    assert_eq!(done.status, ReservationStatus::Completed);

    // Released even though another reservation is still active
    let room = repo::room::find_by_id(&ctx.state.pool, room.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(room.state, RoomState::Free);

    let err = ctx.state.reservations.complete(first.id, &admin).await.unwrap_err();
    assert!(matches!(err, ReservationError::Finalized { .. }));
    let err = ctx.state.reservations.cancel(first.id, &admin).await.unwrap_err();
    assert!(matches!(err, ReservationError::Finalized { .. }));
}

#[tokio::test]
async fn update_rechecks_conflicts_excluding_itself() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let luis = seed_user(&ctx.state, "Luis", "luis@aulas.test", Role::User).await;
    let room = seed_room(&ctx.state, "A-101").await;

    let mine = ctx
        .state
        .reservations
        .create(&ana, booking(room.id, (9, 0), (10, 0)))
        .await
        .unwrap()
        .reservation;
    ctx.state
        .reservations
        .create(&luis, booking(room.id, (11, 0), (12, 0)))
        .await
        .unwrap();

    // Stretching within its own window does not conflict with itself
    let moved = ctx
        .state
        .reservations
        .update(
            mine.id,
            &ana,
            ReservationUpdate {
                end_time: Some(at(10, 30)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.end_time, at(10, 30));
    assert_eq!(moved.start_time, at(9, 0));

    let err = ctx
        .state
        .reservations
        .update(
            mine.id,
            &ana,
            ReservationUpdate {
                end_time: Some(at(11, 30)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Conflict));

    let err = ctx
        .state
        .reservations
        .update(
            mine.id,
            &ana,
            ReservationUpdate {
                start_time: Some(at(11, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::InvalidTimeRange));

    let err = ctx
        .state
        .reservations
        .update(mine.id, &luis, ReservationUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::NotOwner));
}

#[tokio::test]
async fn update_keeps_or_clears_group_link() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let room = seed_room(&ctx.state, "A-101").await;

    let mut input = booking(room.id, (9, 0), (10, 0));
    input.whatsapp_group = Some("https://chat.whatsapp.com/x".into());
    let r = ctx.state.reservations.create(&ana, input).await.unwrap().reservation;

    let kept = ctx
        .state
        .reservations
        .update(
            r.id,
            &ana,
            ReservationUpdate {
                date: Some(day(2030, 3, 5)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(kept.whatsapp_group.as_deref(), Some("https://chat.whatsapp.com/x"));
    assert_eq!(kept.date, day(2030, 3, 5));

    let cleared = ctx
        .state
        .reservations
        .update(
            r.id,
            &ana,
            ReservationUpdate {
                whatsapp_group: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.whatsapp_group, None);
    assert_eq!(cleared.status, ReservationStatus::Active);
}

#[tokio::test]
async fn finalized_reservation_cannot_be_updated() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let room = seed_room(&ctx.state, "A-101").await;

    let r = ctx
        .state
        .reservations
        .create(&ana, booking(room.id, (9, 0), (10, 0)))
        .await
        .unwrap()
        .reservation;
    ctx.state.reservations.cancel(r.id, &ana).await.unwrap();

    let err = ctx
        .state
        .reservations
        .update(
            r.id,
            &ana,
            ReservationUpdate {
                end_time: Some(at(11, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Finalized { .. }));
}

#[tokio::test]
async fn concurrent_overlapping_creates_admit_exactly_one() {
    let ctx = setup().await;
    let room = seed_room(&ctx.state, "A-101").await;

    let mut users = Vec::new();
    for i in 0..8 {
        users.push(
            seed_user(
                &ctx.state,
                &format!("User {i}"),
                &format!("user{i}@aulas.test"),
                Role::User,
            )
            .await,
        );
    }

    let mut handles = Vec::new();
    for (i, user) in users.into_iter().enumerate() {
        let manager = ctx.state.reservations.clone();
        let input = booking(room.id, (9, i as u32 % 3 * 10), (10, 0));
        handles.push(tokio::spawn(async move { manager.create(&user, input).await }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(ReservationError::Conflict) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
}
