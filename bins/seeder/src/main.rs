//! Database seeder for Ziklo development and testing.
//!
//! Seeds a small catalog (users, cost centers, projects, engineers, concepts)
//! and two weeks of time entries ending yesterday. Records that already exist
//! are left alone.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;
use ziklo_core::timesheet::{TimeEntry, TimeEntryFilter, TimeEntryStore};
use ziklo_db::repositories::{
    NewConcept, NewCostCenter, NewEngineer, NewProject, NewUser,
};
use ziklo_db::{CatalogError, CatalogRepository, TimeEntryRepository};
use ziklo_shared::types::{ConceptId, CostCenterId, EngineerId, ProjectId, TimeEntryId, UserId};

/// Users seeded for local development: (name, email).
const USERS: [(&str, &str); 3] = [
    ("Laura Gomez", "laura.gomez@ziklo.dev"),
    ("Andres Rojas", "andres.rojas@ziklo.dev"),
    ("Camila Torres", "camila.torres@ziklo.dev"),
];

/// Cost centers: (code, name).
const COST_CENTERS: [(&str, &str); 2] = [("CC-ENG", "Engineering"), ("CC-OPS", "Operations")];

/// Concepts: (code, name).
const CONCEPTS: [(&str, &str); 3] = [
    ("DEV", "Development"),
    ("MTG", "Meetings"),
    ("SUP", "Support"),
];

/// IDs the time entry seed needs.
struct SeededCatalog {
    leader: Uuid,
    engineers: Vec<Uuid>,
    cost_centers: Vec<Uuid>,
    projects: Vec<Uuid>,
    concepts: Vec<Uuid>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set in environment"))?;

    println!("Connecting to database...");
    let db = ziklo_db::connect(&database_url).await?;
    ziklo_db::migrate(&db).await?;

    println!("Seeding catalog...");
    let catalog = seed_catalog(&db).await?;

    println!("Seeding time entries...");
    seed_time_entries(&db, &catalog).await?;

    println!("Seeding complete!");
    Ok(())
}

/// Treats a duplicate as "already seeded".
fn created<T>(result: Result<T, CatalogError>, label: &str) -> Result<Option<T>, CatalogError> {
    match result {
        Ok(record) => {
            println!("  Created {label}");
            Ok(Some(record))
        }
        Err(CatalogError::Duplicate { .. }) => {
            println!("  {label} already exists, skipping...");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

async fn seed_catalog(db: &DatabaseConnection) -> anyhow::Result<SeededCatalog> {
    let repo = CatalogRepository::new(db.clone());

    for (name, email) in USERS {
        created(
            repo.create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                status: None,
            })
            .await,
            &format!("user {email}"),
        )?;
    }
    let users = repo.list_users().await?;
    let user_id = |email: &str| users.iter().find(|u| u.email == email).map(|u| u.id);

    for (code, name) in COST_CENTERS {
        created(
            repo.create_cost_center(NewCostCenter {
                code: code.to_string(),
                name: name.to_string(),
                status: None,
            })
            .await,
            &format!("cost center {code}"),
        )?;
    }
    let cost_centers = repo.list_cost_centers().await?;
    let cost_center_ids: Vec<Uuid> = cost_centers.iter().map(|c| c.id).collect();

    let leader = user_id(USERS[0].1)
        .ok_or_else(|| anyhow::anyhow!("seeded leader user is missing"))?;
    for (code, name, client, cost_center) in [
        ("PROJ-PORTAL", "Customer Portal", "Acme Corp", cost_center_ids.first()),
        ("PROJ-ERP", "ERP Migration", "Globex", cost_center_ids.get(1)),
    ] {
        created(
            repo.create_project(NewProject {
                code: code.to_string(),
                name: name.to_string(),
                client: client.to_string(),
                status: None,
                leader_user_id: Some(leader),
                cost_center_id: cost_center.copied(),
            })
            .await,
            &format!("project {code}"),
        )?;
    }

    for (index, (_, email)) in USERS.iter().enumerate().skip(1) {
        let document_number = format!("1020{index:04}");
        created(
            repo.create_engineer(NewEngineer {
                user_id: user_id(email),
                document_number: document_number.clone(),
                title: "Software Engineer".to_string(),
                status: None,
            })
            .await,
            &format!("engineer {document_number}"),
        )?;
    }

    for (code, name) in CONCEPTS {
        created(
            repo.create_concept(NewConcept {
                code: code.to_string(),
                name: name.to_string(),
                status: None,
            })
            .await,
            &format!("concept {code}"),
        )?;
    }

    Ok(SeededCatalog {
        leader,
        engineers: repo.list_engineers().await?.iter().map(|e| e.id).collect(),
        cost_centers: cost_center_ids,
        projects: repo.list_projects().await?.iter().map(|p| p.id).collect(),
        concepts: repo.list_concepts().await?.iter().map(|c| c.id).collect(),
    })
}

/// Weekdays in the fourteen days before `today`.
fn working_days(today: NaiveDate) -> Vec<NaiveDate> {
    (1..=14)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

async fn seed_time_entries(db: &DatabaseConnection, catalog: &SeededCatalog) -> anyhow::Result<()> {
    let repo = TimeEntryRepository::new(db.clone());
    let days = working_days(Utc::now().date_naive());

    for (i, engineer) in catalog.engineers.iter().enumerate() {
        let engineer_id = EngineerId::from_uuid(*engineer);
        let existing = repo
            .list(&TimeEntryFilter {
                engineer_id: Some(engineer_id),
                ..TimeEntryFilter::default()
            })
            .await?;
        if !existing.is_empty() {
            println!("  Engineer {engineer} already has entries, skipping...");
            continue;
        }

        let (Some(project), Some(cost_center)) = (
            catalog.projects.get(i % catalog.projects.len().max(1)),
            catalog.cost_centers.get(i % catalog.cost_centers.len().max(1)),
        ) else {
            continue;
        };

        let mut count = 0;
        for (d, date) in days.iter().enumerate() {
            // Six hours of development and two of something else.
            let split = [
                (catalog.concepts.first(), Decimal::from(6)),
                (catalog.concepts.get(1 + d % 2), Decimal::from(2)),
            ];
            for (concept, hours) in split {
                let Some(concept) = concept else { continue };
                let now = Utc::now();
                repo.insert(&TimeEntry {
                    id: TimeEntryId::new(),
                    date: *date,
                    project_id: ProjectId::from_uuid(*project),
                    cost_center_id: CostCenterId::from_uuid(*cost_center),
                    engineer_id,
                    concept_id: ConceptId::from_uuid(*concept),
                    hours,
                    notes: format!("Seeded work on {date}"),
                    created_by: Some(UserId::from_uuid(catalog.leader)),
                    post_export_adjustment: false,
                    created_at: now,
                    updated_at: now,
                })
                .await?;
                count += 1;
            }
        }
        println!("  Created {count} entries for engineer {engineer}");
    }

    Ok(())
}
