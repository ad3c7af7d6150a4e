mod common;

use aula_server::ReservationError;
use aula_server::db::repository as repo;
use chrono::NaiveDateTime;
use common::{at, day, seed_room, seed_user, setup};
use rand::{Rng, SeedableRng, rngs::StdRng};
use shared::models::{
    AuditAction, AuditQuery, ReservationCreate, ReservationStatus, Role, RoomState,
};

fn instant(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    day(y, m, d).and_time(at(h, min))
}

#[tokio::test]
async fn sweep_completes_ended_reservations_and_frees_rooms() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let a101 = seed_room(&ctx.state, "A-101").await;
    let b202 = seed_room(&ctx.state, "B-202").await;

    let yesterday = ctx
        .state
        .reservations
        .create(
            &ana,
            ReservationCreate {
                room_id: a101.id,
                date: day(2030, 5, 9),
                start_time: at(15, 0),
                end_time: at(16, 0),
                whatsapp_group: None,
            },
        )
        .await
        .unwrap()
        .reservation;
    let ends_now = ctx
        .state
        .reservations
        .create(
            &ana,
            ReservationCreate {
                room_id: b202.id,
                date: day(2030, 5, 10),
                start_time: at(8, 0),
                end_time: at(10, 0),
                whatsapp_group: None,
            },
        )
        .await
        .unwrap()
        .reservation;
    let later = ctx
        .state
        .reservations
        .create(
            &ana,
            ReservationCreate {
                room_id: b202.id,
                date: day(2030, 5, 10),
                start_time: at(11, 0),
                end_time: at(12, 0),
                whatsapp_group: None,
            },
        )
        .await
        .unwrap()
        .reservation;

    let now = instant(2030, 5, 10, 10, 0);
    assert_eq!(ctx.state.sweeper.sweep_at(now).await, 2);

    for id in [yesterday.id, ends_now.id] {
        let r = repo::reservation::find_by_id(&ctx.state.pool, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(r.status, ReservationStatus::Completed);
    }
    let r = repo::reservation::find_by_id(&ctx.state.pool, later.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(r.status, ReservationStatus::Active);

    for room_id in [a101.id, b202.id] {
        let room = repo::room::find_by_id(&ctx.state.pool, room_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(room.state, RoomState::Free);
        assert_eq!(room.occupied_by, None);
    }

    // Nothing left to do on a second run at the same instant
    assert_eq!(ctx.state.sweeper.sweep_at(now).await, 0);

    let entries = ctx
        .state
        .audit_service
        .query(&AuditQuery {
            action: Some(AuditAction::AutoComplete),
            limit: 10,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.user_id.is_none()));
}

#[tokio::test]
async fn sweep_skips_reservations_finalized_meanwhile() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let room = seed_room(&ctx.state, "A-101").await;

    let r = ctx
        .state
        .reservations
        .create(
            &ana,
            ReservationCreate {
                room_id: room.id,
                date: day(2030, 5, 10),
                start_time: at(8, 0),
                end_time: at(9, 0),
                whatsapp_group: None,
            },
        )
        .await
        .unwrap()
        .reservation;

    ctx.state.reservations.cancel(r.id, &ana).await.unwrap();

    let err = ctx.state.reservations.auto_complete(r.id).await.unwrap_err();
    assert!(matches!(
        err,
        ReservationError::Finalized {
            status: ReservationStatus::Cancelled,
            ..
        }
    ));
    assert_eq!(
        ctx.state.sweeper.sweep_at(instant(2030, 5, 10, 12, 0)).await,
        0
    );

    let r = repo::reservation::find_by_id(&ctx.state.pool, r.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(r.status, ReservationStatus::Cancelled);
}

#[tokio::test]
async fn concurrent_sweeps_complete_each_reservation_once() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;

    for i in 0..5 {
        let room = seed_room(&ctx.state, &format!("Aula {i}")).await;
        ctx.state
            .reservations
            .create(
                &ana,
                ReservationCreate {
                    room_id: room.id,
                    date: day(2030, 1, 1),
                    start_time: at(8, 0),
                    end_time: at(9, 0),
                    whatsapp_group: None,
                },
            )
            .await
            .unwrap();
    }

    let now = instant(2030, 1, 2, 0, 0);
    let a = ctx.state.sweeper.clone();
    let b = ctx.state.sweeper.clone();
    let (x, y) = tokio::join!(a.sweep_at(now), b.sweep_at(now));
    assert_eq!(x + y, 5);
}

/// Random booking attempts never leave two overlapping active reservations
/// in the same room and day, and every rejection is a real overlap.
#[tokio::test]
async fn random_bookings_never_overlap() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let admin = seed_user(&ctx.state, "Admin", "admin@aulas.test", Role::Admin).await;
    let room = seed_room(&ctx.state, "A-101").await;
    let date = day(2030, 7, 1);

    let mut rng = StdRng::seed_from_u64(0xA01A);
    // Active slots as minutes since midnight, tracked by id
    let mut model: Vec<(i64, u32, u32)> = Vec::new();

    for _ in 0..120 {
        if !model.is_empty() && rng.gen_bool(0.2) {
            let idx = rng.gen_range(0..model.len());
            let (id, _, _) = model.swap_remove(idx);
            ctx.state.reservations.cancel(id, &admin).await.unwrap();
            continue;
        }

        let start = rng.gen_range(7 * 60..21 * 60) / 15 * 15;
        let len = rng.gen_range(1..=8) * 15;
        let end = (start + len).min(22 * 60);

        let input = ReservationCreate {
            room_id: room.id,
            date,
            start_time: at(start / 60, start % 60),
            end_time: at(end / 60, end % 60),
            whatsapp_group: None,
        };
        let expected_conflict = model.iter().any(|&(_, s, e)| start < e && s < end);

        match ctx.state.reservations.create(&ana, input).await {
            Ok(outcome) => {
                assert!(!expected_conflict, "accepted overlapping slot {start}-{end}");
                model.push((outcome.reservation.id, start, end));
            }
            Err(ReservationError::Conflict) => {
                assert!(expected_conflict, "rejected free slot {start}-{end}");
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    let active = repo::reservation::active_slots(&ctx.state.pool, room.id, date, None)
        .await
        .unwrap();
    assert_eq!(active.len(), model.len());
    for (i, a) in active.iter().enumerate() {
        for b in active.iter().skip(i + 1) {
            assert!(!(a.0 < b.1 && b.0 < a.1), "overlap between {a:?} and {b:?}");
        }
    }
}
