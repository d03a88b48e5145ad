//! Dashboards and reports (read-only)

use chrono::Months;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AdminDashboard, AdminStats, GlobalReport, GymDashboard, GymProfile, GymReport, LedgerEntry,
    MemberDashboard, MemberProfile, MemberSummary, PLANS, Page, PageQuery, RecentGym,
    ReportPeriod, Role, VisitStats, VisitWithGym, VisitWithMember,
};
use shared::util::{DAY_MILLIS, local_datetime, start_of_local_day};
use sqlx::SqlitePool;

use crate::db::{gyms, members, reports, transactions, users, visits};
use crate::error::ServiceResult;

const RECENT_VISITS: i64 = 10;
const RECENT_GYMS: usize = 5;
/// Visits scanned when collecting distinct recent gyms
const RECENT_GYM_SCAN: i64 = 50;

/// Start of a reporting window ending at `now`
pub fn period_start(period: ReportPeriod, now: i64) -> i64 {
    let local = local_datetime(now);
    match period {
        ReportPeriod::Daily => start_of_local_day(local.date_naive()),
        ReportPeriod::Weekly => now - 7 * DAY_MILLIS,
        ReportPeriod::Monthly => local
            .checked_sub_months(Months::new(1))
            .map_or(now - 30 * DAY_MILLIS, |dt| dt.timestamp_millis()),
        ReportPeriod::Yearly => local
            .checked_sub_months(Months::new(12))
            .map_or(now - 365 * DAY_MILLIS, |dt| dt.timestamp_millis()),
    }
}

const ALL_PERIODS: [ReportPeriod; 4] = [
    ReportPeriod::Daily,
    ReportPeriod::Weekly,
    ReportPeriod::Monthly,
    ReportPeriod::Yearly,
];

fn stats_from(counts: [i64; 4]) -> VisitStats {
    VisitStats {
        today: counts[0],
        this_week: counts[1],
        this_month: counts[2],
        this_year: counts[3],
    }
}

// ── Member ──────────────────────────────────────────────────────────

pub async fn member_dashboard(
    pool: &SqlitePool,
    member_id: i64,
    now: i64,
) -> ServiceResult<MemberDashboard> {
    let member = members::find_by_id(pool, member_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound))?;

    let (scan, _) = visits::list_for_member(pool, member_id, RECENT_GYM_SCAN, 0).await?;
    let mut gym_ids: Vec<i64> = Vec::new();
    for v in &scan {
        if !gym_ids.contains(&v.visit.gym_id) {
            gym_ids.push(v.visit.gym_id);
            if gym_ids.len() == RECENT_GYMS {
                break;
            }
        }
    }
    let mut recent_gyms = Vec::with_capacity(gym_ids.len());
    for id in gym_ids {
        if let Some(gym) = gyms::find_by_id(pool, id).await? {
            recent_gyms.push(RecentGym {
                id: gym.id,
                location: gym.location(),
                name: gym.name,
                gym_code: gym.gym_code,
            });
        }
    }

    let mut counts = [0; 4];
    for (slot, period) in counts.iter_mut().zip(ALL_PERIODS) {
        *slot = visits::count_for_member_since(pool, member_id, period_start(period, now)).await?;
    }

    let recent_visits: Vec<VisitWithGym> =
        scan.into_iter().take(RECENT_VISITS as usize).collect();
    Ok(MemberDashboard {
        member: MemberSummary {
            subscription: member.subscription(),
            name: member.name,
            email: member.email,
            tokens: member.tokens,
        },
        recent_visits,
        recent_gyms,
        visit_stats: stats_from(counts),
        subscription_plans: &PLANS,
    })
}

pub async fn visit_history(
    pool: &SqlitePool,
    member_id: i64,
    query: &PageQuery,
) -> ServiceResult<Page<VisitWithGym>> {
    let (items, total) =
        visits::list_for_member(pool, member_id, query.limit(), query.offset()).await?;
    Ok(Page::new(items, query, total))
}

pub async fn transaction_history(
    pool: &SqlitePool,
    member_id: i64,
    query: &PageQuery,
) -> ServiceResult<Page<LedgerEntry>> {
    let (items, total) =
        transactions::list_for_member(pool, member_id, query.limit(), query.offset()).await?;
    Ok(Page::new(items, query, total))
}

// ── Gym ─────────────────────────────────────────────────────────────

pub async fn gym_dashboard(pool: &SqlitePool, gym_id: i64, now: i64) -> ServiceResult<GymDashboard> {
    let gym = gyms::find_by_id(pool, gym_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::GymNotFound))?;

    let mut counts = [0; 4];
    for (slot, period) in counts.iter_mut().zip(ALL_PERIODS) {
        *slot = visits::count_for_gym_since(pool, gym_id, period_start(period, now)).await?;
    }

    Ok(GymDashboard {
        gym: GymProfile::from(gym),
        visit_stats: stats_from(counts),
        recent_visits: visits::list_for_gym_since(pool, gym_id, 0, Some(RECENT_VISITS)).await?,
        unique_members: visits::distinct_members_for_gym(pool, gym_id).await?,
    })
}

pub async fn gym_report(
    pool: &SqlitePool,
    gym_id: i64,
    period: ReportPeriod,
    now: i64,
) -> ServiceResult<GymReport> {
    let start = period_start(period, now);
    let visits = visits::list_for_gym_since(pool, gym_id, start, None).await?;
    Ok(GymReport {
        period,
        start_date: start,
        end_date: now,
        total_visits: visits.len() as i64,
        visits,
    })
}

/// Visits recorded under today's calendar day, newest first
pub async fn today_visits(
    pool: &SqlitePool,
    gym_id: i64,
    now: i64,
) -> ServiceResult<Vec<VisitWithMember>> {
    let today = shared::util::local_day(now);
    Ok(visits::list_for_gym_on_day(pool, gym_id, &today).await?)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub const CSV_HEADER: &str = "Date,Time,Member Name,Member Email,Tokens Used";

/// Gym report as CSV, one row per visit in local time
pub fn report_csv(report: &GymReport) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for v in &report.visits {
        let at = local_datetime(v.visit.check_in_time);
        let row = [
            at.format("%Y-%m-%d").to_string(),
            at.format("%H:%M:%S").to_string(),
            csv_field(&v.member_name),
            csv_field(&v.member_email),
            v.visit.tokens_used.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

// ── Admin ───────────────────────────────────────────────────────────

pub async fn admin_dashboard(pool: &SqlitePool, now: i64) -> ServiceResult<AdminDashboard> {
    Ok(AdminDashboard {
        stats: AdminStats {
            total_members: users::count_active_by_role(pool, Role::Member).await?,
            total_gyms: users::count_active_by_role(pool, Role::Gym).await?,
            total_visits: visits::count_all(pool).await?,
            total_revenue: reports::total_revenue_cents(pool).await?,
            active_subscriptions: members::count_current_subscriptions(pool, now).await?,
        },
        recent_visits: visits::recent_all(pool, RECENT_VISITS).await?,
    })
}

pub async fn list_members(pool: &SqlitePool, query: &PageQuery) -> ServiceResult<Page<MemberProfile>> {
    let (rows, total) = members::list(pool, query).await?;
    Ok(Page::new(rows, query, total).map(MemberProfile::from))
}

pub async fn list_gyms(pool: &SqlitePool, query: &PageQuery) -> ServiceResult<Page<GymProfile>> {
    let (rows, total) = gyms::list(pool, query).await?;
    Ok(Page::new(rows, query, total).map(GymProfile::from))
}

pub async fn global_report(
    pool: &SqlitePool,
    period: ReportPeriod,
    now: i64,
) -> ServiceResult<GlobalReport> {
    let start = period_start(period, now);
    Ok(GlobalReport {
        period,
        start_date: start,
        end_date: now,
        visits_by_gym: reports::visits_by_gym_since(pool, start).await?,
        revenue_by_plan: reports::revenue_by_plan_since(pool, start).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenewalPolicy;
    use crate::db::test_support::{seed_gym, seed_member, test_pool};
    use crate::services::{checkin, ledger};
    use chrono::{Local, NaiveDate, TimeZone};
    use shared::models::PlanId;

    const NOW: i64 = 1_718_000_000_000;

    #[test]
    fn period_windows() {
        let now = Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2025, 3, 31).unwrap().and_hms_opt(15, 30, 0).unwrap(),
            )
            .earliest()
            .unwrap();
        let millis = now.timestamp_millis();

        let daily = local_datetime(period_start(ReportPeriod::Daily, millis));
        assert_eq!(daily.format("%Y-%m-%d %H:%M").to_string(), "2025-03-31 00:00");
        assert_eq!(period_start(ReportPeriod::Weekly, millis), millis - 7 * DAY_MILLIS);
        // month arithmetic clamps to the last day of February
        let monthly = local_datetime(period_start(ReportPeriod::Monthly, millis));
        assert_eq!(monthly.format("%Y-%m-%d").to_string(), "2025-02-28");
        let yearly = local_datetime(period_start(ReportPeriod::Yearly, millis));
        assert_eq!(yearly.format("%Y-%m-%d").to_string(), "2024-03-31");
    }

    #[test]
    fn csv_escapes_fields() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("Doe, Jane"), "\"Doe, Jane\"");
        assert_eq!(csv_field("the \"rock\""), "\"the \"\"rock\"\"\"");
    }

    #[tokio::test]
    async fn member_dashboard_collects_recent_gyms() {
        let pool = test_pool().await;
        let member = seed_member(&pool, "dash@fit.io", 0).await;
        seed_gym(&pool, "FZ001", "FitZone Downtown").await;
        seed_gym(&pool, "FZ002", "FitZone Uptown").await;

        ledger::purchase(&pool, member, "weekly", RenewalPolicy::Overwrite, NOW).await.unwrap();
        checkin::check_in(&pool, member, "FZ001", NOW - 2 * DAY_MILLIS).await.unwrap();
        checkin::check_in(&pool, member, "FZ002", NOW - DAY_MILLIS).await.unwrap();
        checkin::check_in(&pool, member, "FZ001", NOW).await.unwrap();

        let dash = member_dashboard(&pool, member, NOW).await.unwrap();
        assert_eq!(dash.member.tokens, 4);
        assert_eq!(dash.member.subscription.map(|s| s.plan), Some(PlanId::Weekly));
        assert_eq!(dash.recent_visits.len(), 3);
        assert_eq!(dash.recent_visits[0].gym_code, "FZ001");
        let codes: Vec<_> = dash.recent_gyms.iter().map(|g| g.gym_code.as_str()).collect();
        assert_eq!(codes, ["FZ001", "FZ002"]);
        assert_eq!(dash.visit_stats.this_week, 3);
        assert_eq!(dash.visit_stats.this_year, 3);
        assert_eq!(dash.subscription_plans.len(), 3);

        let page = visit_history(&pool, member, &PageQuery { page: Some(2), limit: Some(2), search: None })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total, 3);
        assert!(page.pagination.has_prev);
        assert!(!page.pagination.has_next);
    }

    #[tokio::test]
    async fn gym_views_and_csv() {
        let pool = test_pool().await;
        let gym = seed_gym(&pool, "FZ001", "FitZone Downtown").await;
        let a = seed_member(&pool, "a@fit.io", 3).await;
        let b = seed_member(&pool, "b@fit.io", 3).await;

        checkin::check_in(&pool, a, "FZ001", NOW - 40 * DAY_MILLIS).await.unwrap();
        checkin::check_in(&pool, a, "FZ001", NOW).await.unwrap();
        checkin::check_in(&pool, b, "FZ001", NOW + 1_000).await.unwrap();

        let dash = gym_dashboard(&pool, gym, NOW + 2_000).await.unwrap();
        assert_eq!(dash.unique_members, 2);
        assert_eq!(dash.visit_stats.this_year, 3);
        assert_eq!(dash.visit_stats.this_week, 2);
        assert_eq!(dash.recent_visits.len(), 3);
        assert_eq!(dash.recent_visits[0].member_email, "b@fit.io");

        let today = today_visits(&pool, gym, NOW + 2_000).await.unwrap();
        assert_eq!(today.len(), 2);

        let report = gym_report(&pool, gym, ReportPeriod::Monthly, NOW + 2_000).await.unwrap();
        assert_eq!(report.total_visits, 2);
        let csv = report_csv(&report);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",Member b@fit.io,b@fit.io,1"));
    }

    #[tokio::test]
    async fn admin_views() {
        let pool = test_pool().await;
        let member = seed_member(&pool, "m@fit.io", 0).await;
        seed_member(&pool, "other@fit.io", 0).await;
        seed_gym(&pool, "FZ001", "FitZone Downtown").await;

        ledger::purchase(&pool, member, "monthly", RenewalPolicy::Overwrite, NOW).await.unwrap();
        checkin::check_in(&pool, member, "FZ001", NOW).await.unwrap();

        let dash = admin_dashboard(&pool, NOW).await.unwrap();
        assert_eq!(dash.stats.total_members, 2);
        assert_eq!(dash.stats.total_gyms, 1);
        assert_eq!(dash.stats.total_visits, 1);
        assert_eq!(dash.stats.total_revenue, 9999);
        assert_eq!(dash.stats.active_subscriptions, 1);
        assert_eq!(dash.recent_visits[0].gym_code, "FZ001");

        let found = list_members(
            &pool,
            &PageQuery { page: None, limit: None, search: Some("OTHER".into()) },
        )
        .await
        .unwrap();
        assert_eq!(found.pagination.total, 1);
        assert_eq!(found.items[0].email, "other@fit.io");

        let gyms = list_gyms(&pool, &PageQuery::default()).await.unwrap();
        assert_eq!(gyms.items.len(), 1);

        let report = global_report(&pool, ReportPeriod::Monthly, NOW + 1).await.unwrap();
        assert_eq!(report.visits_by_gym[0].total_visits, 1);
        assert_eq!(report.revenue_by_plan[0].plan, PlanId::Monthly);
        assert_eq!(report.revenue_by_plan[0].total_revenue, 9999);
    }
}
