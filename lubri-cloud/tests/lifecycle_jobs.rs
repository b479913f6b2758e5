//! Lifecycle job integration tests against the in-memory store
//! Run: cargo test -p lubri-cloud --test lifecycle_jobs

use lubri_cloud::db;
use lubri_cloud::db::models::{Lubricentro, LubricentroCreate};
use lubri_cloud::db::repository::{LubricentroRepository, NotificationRepository};
use lubri_cloud::jobs::{JobOutcome, LifecycleSweepJob, MonthlyResetJob, PaymentReminderJob};
use lubri_cloud::db::models::NotificationStatus;
use shared::models::{PaymentStatus, SubscriptionStatus};
use shared::util::{self, MILLIS_PER_DAY};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

const TZ: chrono_tz::Tz = chrono_tz::America::Argentina::Buenos_Aires;

async fn setup() -> (Surreal<Db>, LubricentroRepository) {
    let db = db::open_memory().await.unwrap();
    let repo = LubricentroRepository::new(db.clone());
    (db, repo)
}

async fn register(repo: &LubricentroRepository, name: &str, now: i64) -> Lubricentro {
    repo.create(
        LubricentroCreate {
            fantasy_name: name.to_string(),
            responsable: "Ana Pérez".to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            cuit: "30-12345678-9".to_string(),
        },
        7,
        now,
    )
    .await
    .unwrap()
}

async fn set_fields(db: &Surreal<Db>, t: &Lubricentro, sql_set: &str, bindings: Vec<(&str, i64)>) {
    let mut query = db
        .query(format!("UPDATE $id SET {sql_set}"))
        .bind(("id", t.id.clone().unwrap()));
    for (name, value) in bindings {
        query = query.bind((name.to_string(), value));
    }
    query.await.unwrap();
}

fn completed_detail(outcome: JobOutcome) -> serde_json::Value {
    match outcome {
        JobOutcome::Completed { detail } => detail,
        JobOutcome::Failed { detail } => panic!("job failed: {detail}"),
    }
}

#[tokio::test]
async fn sweep_expires_overdue_trials_only() {
    let (db, repo) = setup().await;
    let now = util::now_millis();
    let overdue = register(&repo, "Lubri Norte", now).await;
    let open = register(&repo, "Lubri Sur", now).await;

    set_fields(&db, &overdue, "trial_end_date = $end", vec![("end", now - MILLIS_PER_DAY)]).await;

    let counts = repo.run_daily_sweep(now).await.unwrap();

    assert_eq!(counts.trials_expired, 1);
    assert_eq!(counts.renewals_pending, 0);
    assert_eq!(counts.subscriptions_deactivated, 0);
    assert_eq!(counts.cycles_rolled, 0);

    let overdue_after = repo.find_by_id(&overdue.id_string()).await.unwrap().unwrap();
    let open_after = repo.find_by_id(&open.id_string()).await.unwrap().unwrap();
    assert_eq!(overdue_after.status, SubscriptionStatus::Inactive);
    assert_eq!(open_after.status, SubscriptionStatus::Trial);
}

#[tokio::test]
async fn sweep_flags_expired_auto_renewals_for_payment() {
    let (db, repo) = setup().await;
    let now = util::now_millis();
    let t = register(&repo, "Lubri Norte", now).await;

    set_fields(
        &db,
        &t,
        "status = 'active', auto_renewal = true, subscription_end_date = $end",
        vec![("end", now - MILLIS_PER_DAY)],
    )
    .await;

    let counts = repo.run_daily_sweep(now).await.unwrap();
    assert_eq!(counts.renewals_pending, 1);

    // stays active, payment pending
    let after = repo.find_by_id(&t.id_string()).await.unwrap().unwrap();
    assert_eq!(after.status, SubscriptionStatus::Active);
    assert_eq!(after.payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn sweep_deactivates_expired_manual_subscriptions() {
    let (db, repo) = setup().await;
    let now = util::now_millis();
    let t = register(&repo, "Lubri Norte", now).await;

    set_fields(
        &db,
        &t,
        "status = 'active', auto_renewal = false, subscription_end_date = $end",
        vec![("end", now - MILLIS_PER_DAY)],
    )
    .await;

    let counts = repo.run_daily_sweep(now).await.unwrap();
    assert_eq!(counts.subscriptions_deactivated, 1);

    let after = repo.find_by_id(&t.id_string()).await.unwrap().unwrap();
    assert_eq!(after.status, SubscriptionStatus::Inactive);
}

#[tokio::test]
async fn sweep_rolls_finished_billing_cycles_forward() {
    let (db, repo) = setup().await;
    let now = util::now_millis();
    let monthly = register(&repo, "Lubri Norte", now).await;
    let semiannual = register(&repo, "Lubri Sur", now).await;

    let old_end = now - MILLIS_PER_DAY;
    set_fields(
        &db,
        &monthly,
        "status = 'active', current_period_end = $end",
        vec![("end", old_end)],
    )
    .await;
    set_fields(
        &db,
        &semiannual,
        "status = 'active', current_period_end = $end, renewal_interval = 'semiannual'",
        vec![("end", old_end)],
    )
    .await;

    let counts = repo.run_daily_sweep(now).await.unwrap();
    assert_eq!(counts.cycles_rolled, 2);

    let monthly_after = repo.find_by_id(&monthly.id_string()).await.unwrap().unwrap();
    assert_eq!(monthly_after.current_period_end, Some(util::add_months(now, 1)));
    assert_eq!(monthly_after.next_payment_date, monthly_after.current_period_end);
    assert_eq!(monthly_after.payment_status, PaymentStatus::Pending);
    assert_eq!(monthly_after.status, SubscriptionStatus::Active);

    let semiannual_after = repo.find_by_id(&semiannual.id_string()).await.unwrap().unwrap();
    assert_eq!(semiannual_after.current_period_end, Some(util::add_months(now, 6)));
}

#[tokio::test]
async fn sweep_job_reports_per_step_counts() {
    let (db, repo) = setup().await;
    let now = util::now_millis();
    let trial = register(&repo, "Lubri Norte", now).await;
    let manual = register(&repo, "Lubri Sur", now).await;

    set_fields(&db, &trial, "trial_end_date = $end", vec![("end", now - MILLIS_PER_DAY)]).await;
    set_fields(
        &db,
        &manual,
        "status = 'active', auto_renewal = false, subscription_end_date = $end",
        vec![("end", now - MILLIS_PER_DAY)],
    )
    .await;

    let job = LifecycleSweepJob::new(db, CancellationToken::new(), TZ, 0);
    let detail = completed_detail(job.run_once(now).await);

    assert_eq!(detail["trials_expired"], 1);
    assert_eq!(detail["subscriptions_deactivated"], 1);
    assert_eq!(detail["renewals_pending"], 0);
    assert_eq!(detail["cycles_rolled"], 0);
}

#[tokio::test]
async fn sweep_on_a_quiet_store_changes_nothing() {
    let (db, repo) = setup().await;
    let now = util::now_millis();
    register(&repo, "Lubri Norte", now).await;

    let job = LifecycleSweepJob::new(db, CancellationToken::new(), TZ, 0);
    let detail = completed_detail(job.run_once(now).await);

    assert_eq!(detail["trials_expired"], 0);
    assert_eq!(detail["renewals_pending"], 0);
    assert_eq!(detail["subscriptions_deactivated"], 0);
    assert_eq!(detail["cycles_rolled"], 0);
}

#[tokio::test]
async fn monthly_reset_zeroes_every_counter() {
    let (db, repo) = setup().await;
    let now = util::now_millis();
    let a = register(&repo, "Lubri Norte", now).await;
    let b = register(&repo, "Lubri Sur", now).await;

    set_fields(&db, &a, "services_used_this_month = $n", vec![("n", 42)]).await;
    set_fields(&db, &b, "services_used_this_month = $n", vec![("n", 7)]).await;

    let job = MonthlyResetJob::new(db, CancellationToken::new(), TZ);
    let detail = completed_detail(job.run_once(now).await);
    assert_eq!(detail["counters_reset"], 2);

    for t in [&a, &b] {
        let after = repo.find_by_id(&t.id_string()).await.unwrap().unwrap();
        assert_eq!(after.services_used_this_month, 0);
    }
}

#[tokio::test]
async fn reminders_cover_the_window_and_never_duplicate() {
    let (db, repo) = setup().await;
    let notifications = NotificationRepository::new(db.clone());
    let now = util::now_millis();
    let due_soon = register(&repo, "Lubri Norte", now).await;
    let due_late = register(&repo, "Lubri Sur", now).await;
    let no_payment = register(&repo, "Lubri Este", now).await;

    set_fields(&db, &due_soon, "next_payment_date = $d", vec![("d", now + 3 * MILLIS_PER_DAY)]).await;
    set_fields(&db, &due_late, "next_payment_date = $d", vec![("d", now + 20 * MILLIS_PER_DAY)]).await;

    let job = PaymentReminderJob::new(db, CancellationToken::new(), TZ, 9, 7);

    let detail = completed_detail(job.run_once(now).await);
    assert_eq!(detail["due_within_window"], 1);
    assert_eq!(detail["reminders_created"], 1);

    // a second pass in the same window writes nothing new
    let detail = completed_detail(job.run_once(now + MILLIS_PER_DAY).await);
    assert_eq!(detail["due_within_window"], 1);
    assert_eq!(detail["reminders_created"], 0);

    let pending = notifications.find_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].lubricentro_id, due_soon.id_string());
    assert_eq!(pending[0].due_date, now + 3 * MILLIS_PER_DAY);
    assert!(pending[0].message.contains("Lubri Norte"));

    let for_late = notifications.find_by_lubricentro(&due_late.id_string()).await.unwrap();
    assert!(for_late.is_empty());
    let for_none = notifications.find_by_lubricentro(&no_payment.id_string()).await.unwrap();
    assert!(for_none.is_empty());
}

#[tokio::test]
async fn delivered_reminder_is_not_reopened_by_a_rerun() {
    let (db, repo) = setup().await;
    let notifications = NotificationRepository::new(db.clone());
    let now = util::now_millis();
    let t = register(&repo, "Lubri Norte", now).await;
    set_fields(&db, &t, "next_payment_date = $d", vec![("d", now + 3 * MILLIS_PER_DAY)]).await;

    let job = PaymentReminderJob::new(db.clone(), CancellationToken::new(), TZ, 9, 7);
    let detail = completed_detail(job.run_once(now).await);
    assert_eq!(detail["reminders_created"], 1);

    // console delivers the reminder
    let sent = notifications.find_by_lubricentro(&t.id_string()).await.unwrap().remove(0);
    db.query("UPDATE $id SET status = 'sent'")
        .bind(("id", sent.id.clone().unwrap()))
        .await
        .unwrap();

    // next day's run sees the same due date and must leave the record alone
    let detail = completed_detail(job.run_once(now + MILLIS_PER_DAY).await);
    assert_eq!(detail["due_within_window"], 1);
    assert_eq!(detail["reminders_created"], 0);

    assert!(notifications.find_pending().await.unwrap().is_empty());
    let after = notifications.find_by_lubricentro(&t.id_string()).await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].status, NotificationStatus::Sent);
    assert_eq!(after[0].created_at, sent.created_at);
}
