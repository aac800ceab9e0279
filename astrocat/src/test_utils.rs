//! Test fixtures (available with the `test-utils` feature).

use crate::adapters::AdapterCollection;
use crate::db::{
    handlers::{Communities, Locals, Memberships, Plans, Professionals, Repository, Services, Sessions, Users},
    models::{
        communities::{CommunityCreateDBRequest, CommunityDBResponse},
        locals::{LocalCreateDBRequest, LocalDBResponse},
        memberships::{MembershipCreateDBRequest, MembershipDBResponse},
        onboardings::{DocumentType, OnboardingCreateDBRequest},
        plans::{PlanCreateDBRequest, PlanDBResponse, PlanType},
        professionals::{ProfessionalCreateDBRequest, ProfessionalDBResponse, ProfessionalType},
        services::{ServiceCreateDBRequest, ServiceDBResponse},
        sessions::{SessionCreateDBRequest, SessionDBResponse},
        users::{UserCreateDBRequest, UserDBResponse, UserRole},
    },
    pools::DbPools,
};
use crate::types::{CommunityId, LocalId, PlanId, ProfessionalId, UserId};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Actor recorded on fixture writes
pub const TEST_ACTOR: &str = "test-user";

pub fn create_test_adapters(pool: PgPool) -> AdapterCollection {
    AdapterCollection::new(DbPools::new(pool))
}

pub fn user_request(email: &str) -> UserCreateDBRequest {
    UserCreateDBRequest::builder()
        .name("Test")
        .first_last_name("User")
        .password_hash("$argon2id$v=19$m=19456,t=2,p=1$fixture")
        .email(email)
        .role(UserRole::Client)
        .build()
}

pub async fn create_test_user(pool: &PgPool) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let email = format!("testuser_{}@example.com", Uuid::new_v4().simple());

    Users::new(&mut conn)
        .create(&user_request(&email), TEST_ACTOR)
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_community(pool: &PgPool, name: &str) -> CommunityDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let request = CommunityCreateDBRequest::builder()
        .name(name)
        .purpose("Testing purposes")
        .build();

    Communities::new(&mut conn)
        .create(&request, TEST_ACTOR)
        .await
        .expect("Failed to create test community")
}

pub async fn create_test_plan(pool: &PgPool) -> PlanDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let request = PlanCreateDBRequest::builder()
        .fee(Decimal::new(2999, 2))
        .plan_type(PlanType::Monthly)
        .reservation_limit(8)
        .build();

    Plans::new(&mut conn)
        .create(&request, TEST_ACTOR)
        .await
        .expect("Failed to create test plan")
}

pub async fn create_test_service(pool: &PgPool, name: &str) -> ServiceDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let request = ServiceCreateDBRequest::builder().name(name).build();

    Services::new(&mut conn)
        .create(&request, TEST_ACTOR)
        .await
        .expect("Failed to create test service")
}

pub fn local_request(name: &str) -> LocalCreateDBRequest {
    LocalCreateDBRequest::builder()
        .local_name(name)
        .street_name("Av. Javier Prado")
        .building_number("450")
        .district("San Isidro")
        .province("Lima")
        .region("Lima")
        .capacity(30)
        .build()
}

pub async fn create_test_local(pool: &PgPool, name: &str) -> LocalDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");

    Locals::new(&mut conn)
        .create(&local_request(name), TEST_ACTOR)
        .await
        .expect("Failed to create test local")
}

pub fn professional_request(email: &str) -> ProfessionalCreateDBRequest {
    ProfessionalCreateDBRequest::builder()
        .name("Carla")
        .first_last_name("Mendoza")
        .specialty("Strength")
        .email(email)
        .phone_number("987654321")
        .professional_type(ProfessionalType::GymTrainer)
        .build()
}

pub async fn create_test_professional(pool: &PgPool) -> ProfessionalDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let email = format!("coach_{}@example.com", Uuid::new_v4().simple());

    Professionals::new(&mut conn)
        .create(&professional_request(&email), TEST_ACTOR)
        .await
        .expect("Failed to create test professional")
}

/// A session starting at `start` and lasting `hours`
pub fn session_request(
    professional_id: ProfessionalId,
    local_id: Option<LocalId>,
    start: DateTime<Utc>,
    hours: i64,
) -> SessionCreateDBRequest {
    SessionCreateDBRequest::builder()
        .title("Functional training")
        .date(start.date_naive())
        .start_time(start)
        .end_time(start + Duration::hours(hours))
        .capacity(20)
        .professional_id(professional_id)
        .maybe_local_id(local_id)
        .build()
}

pub async fn create_test_session(pool: &PgPool, professional_id: ProfessionalId, local_id: Option<LocalId>) -> SessionDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let start = Utc
        .with_ymd_and_hms(2025, 6, 2, 7, 0, 0)
        .single()
        .expect("Fixture timestamp is unambiguous");

    Sessions::new(&mut conn)
        .create(&session_request(professional_id, local_id, start, 1), TEST_ACTOR)
        .await
        .expect("Failed to create test session")
}

pub fn membership_request(
    user_id: UserId,
    community_id: CommunityId,
    plan_id: PlanId,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> MembershipCreateDBRequest {
    MembershipCreateDBRequest::builder()
        .start_date(start_date)
        .end_date(end_date)
        .reservations_used(0)
        .community_id(community_id)
        .user_id(user_id)
        .plan_id(plan_id)
        .build()
}

/// An active 30-day membership for a fresh user, community and plan
pub async fn create_test_membership(pool: &PgPool) -> MembershipDBResponse {
    let user = create_test_user(pool).await;
    let community = create_test_community(pool, &format!("community_{}", Uuid::new_v4().simple())).await;
    let plan = create_test_plan(pool).await;
    let now = Utc::now();

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Memberships::new(&mut conn)
        .create(
            &membership_request(user.id, community.id, plan.id, now, now + Duration::days(30)),
            TEST_ACTOR,
        )
        .await
        .expect("Failed to create test membership")
}

pub fn onboarding_request(user_id: UserId) -> OnboardingCreateDBRequest {
    OnboardingCreateDBRequest::builder()
        .user_id(user_id)
        .phone_number("912345678")
        .document_type(DocumentType::Dni)
        .document_number("70123456")
        .street_name("Jr. Puno")
        .building_number("221")
        .district("Cercado")
        .province("Lima")
        .region("Lima")
        .build()
}
