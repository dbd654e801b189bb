//! Latency harness for the booking engine over a real file-backed store.
//! Run with `cargo bench`. Prints avg/p50/p95/p99 per operation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ulid::Ulid;

use tourbook::engine::Engine;
use tourbook::model::{
    Actor, AvailableDate, CreateBookingRequest, CreateTourRequest, IdValue, Role, TimeSlot,
};

const TOURS: usize = 10;
const DATES_PER_TOUR: usize = 30;
const SLOTS_PER_DATE: usize = 4;
const BOOKINGS: usize = 500;
const AVAILABILITY_QUERIES: usize = 200;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies.last().unwrap().as_secs_f64() * 1000.0,
    );
}

fn bench_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tourbook_bench_{}", Ulid::new()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn date_label(day: usize) -> String {
    format!("2025-{:02}-{:02}", 1 + day / 28, 1 + day % 28)
}

async fn setup(engine: &Engine) -> Vec<i64> {
    let admin = Actor::new("root", Role::Admin);
    let mut tour_ids = Vec::with_capacity(TOURS);

    for t in 0..TOURS {
        let dates = (0..DATES_PER_TOUR)
            .map(|d| AvailableDate {
                date: date_label(d),
                time_slots: (0..SLOTS_PER_DATE)
                    .map(|s| TimeSlot {
                        start_time: format!("{:02}:00", 9 + s * 2),
                        end_time: format!("{:02}:00", 11 + s * 2),
                        max_participants: 5,
                    })
                    .collect(),
            })
            .collect();

        let req = CreateTourRequest {
            title: Some(format!("Tour {t}")),
            description: Some("Bench tour".into()),
            price: Some(30_000),
            duration: Some("2 hours".into()),
            guide_name: Some(format!("Guide {t}")),
            available_dates: Some(dates),
            ..Default::default()
        };
        let tour = engine.create_tour(&req, Some(&admin)).await.unwrap();
        tour_ids.push(tour.id);
    }

    tour_ids
}

#[tokio::main]
async fn main() {
    let dir = bench_dir();
    let engine = Arc::new(Engine::open(&dir).unwrap());

    println!(
        "tourbook stress: {TOURS} tours × {DATES_PER_TOUR} dates × {SLOTS_PER_DATE} slots, data_dir={}",
        dir.display()
    );

    let tour_ids = setup(&engine).await;

    // Booking creation — collection grows as we go, so late ops see the
    // full rewrite cost.
    let mut create_lat = Vec::with_capacity(BOOKINGS);
    for i in 0..BOOKINGS {
        let tour_id = tour_ids[i % tour_ids.len()];
        let day = (i / tour_ids.len()) % DATES_PER_TOUR;
        let slot = (i / (tour_ids.len() * DATES_PER_TOUR)) % SLOTS_PER_DATE;
        let req = CreateBookingRequest {
            tour_id: Some(IdValue::Num(tour_id)),
            tour_title: Some("Bench".into()),
            guide_id: Some(format!("guide-{tour_id}")),
            guide_name: None,
            traveler_id: Some(IdValue::Text(format!("t{i}"))),
            traveler_name: None,
            date: Some(date_label(day)),
            start_time: Some(format!("{:02}:00", 9 + slot * 2)),
            end_time: Some(format!("{:02}:00", 11 + slot * 2)),
            participants: Some(1),
            total_price: Some(30_000),
            status: None,
        };

        let start = Instant::now();
        engine.create_booking(&req).await.unwrap();
        create_lat.push(start.elapsed());
    }
    print_latency("create_booking", &mut create_lat);

    // Availability listing with the store fully populated.
    let mut list_lat = Vec::with_capacity(AVAILABILITY_QUERIES);
    for i in 0..AVAILABILITY_QUERIES {
        let user = format!("t{i}");
        let start = Instant::now();
        let tours = engine.list_tours(Some(user.as_str())).unwrap();
        list_lat.push(start.elapsed());
        assert_eq!(tours.len(), TOURS);
    }
    print_latency("list_tours (availability)", &mut list_lat);

    let _ = std::fs::remove_dir_all(&dir);
}
