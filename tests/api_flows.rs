//! End-to-end workflow tests over the real router and an in-memory
//! database: booking, double-booking, slots, consultations, lab tests,
//! prescription batches, pharmacy dispatch, payments, notifications and
//! vitals.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use carelink::api::router::api_router;
use carelink::api::types::ApiContext;
use carelink::bootstrap;
use carelink::db::open_memory_database;

const ADMIN_EMAIL: &str = "admin@clinic.test";
const ADMIN_PASSWORD: &str = "admin-password-1";
const PASSWORD: &str = "user-password-1";

struct TestEnv {
    ctx: ApiContext,
}

impl TestEnv {
    fn new() -> Self {
        let conn = open_memory_database().unwrap();
        bootstrap::seed_admin(&conn, ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();
        Self {
            ctx: ApiContext::new(conn),
        }
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        let response = api_router(self.ctx.clone())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Register an account; returns (token, profile id).
    async fn register(&self, email: &str, role: &str) -> (String, String) {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "full_name": format!("{role} {email}"),
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["profile"]["id"].as_str().unwrap().to_string(),
        )
    }
}

/// Catalog + staff fixture for clinical flows.
struct Clinic {
    admin: String,
    hospital_id: String,
    department_id: String,
    doctor_token: String,
    doctor_id: String,
    patient_token: String,
    patient_id: String,
}

async fn setup_clinic(env: &TestEnv) -> Clinic {
    let admin = env.admin_token().await;

    let (_, body) = env
        .request(
            "POST",
            "/api/hospitals",
            Some(&admin),
            Some(json!({"name": "General Hospital", "location": "Midtown"})),
        )
        .await;
    let hospital_id = body["id"].as_str().unwrap().to_string();

    let (_, body) = env
        .request(
            "POST",
            "/api/departments",
            Some(&admin),
            Some(json!({"name": "Cardiology"})),
        )
        .await;
    let department_id = body["id"].as_str().unwrap().to_string();

    let (doctor_token, doctor_user_id) = env.register("gregory@clinic.test", "doctor").await;
    let (status, body) = env
        .request(
            "POST",
            "/api/doctors",
            Some(&admin),
            Some(json!({
                "user_id": doctor_user_id,
                "hospital_id": hospital_id,
                "department_id": department_id,
                "specialization": "cardiology",
                "license_number": "LIC-1001",
                "consultation_fee": 5000.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "doctor create failed: {body}");
    let doctor_id = body["doctor"]["id"].as_str().unwrap().to_string();

    let (patient_token, patient_id) = env.register("pat@clinic.test", "patient").await;

    Clinic {
        admin,
        hospital_id,
        department_id,
        doctor_token,
        doctor_id,
        patient_token,
        patient_id,
    }
}

async fn book(
    env: &TestEnv,
    clinic: &Clinic,
    token: &str,
    date: &str,
    time: &str,
) -> (StatusCode, Value) {
    env.request(
        "POST",
        "/api/appointments",
        Some(token),
        Some(json!({
            "doctor_id": clinic.doctor_id,
            "hospital_id": clinic.hospital_id,
            "department_id": clinic.department_id,
            "appointment_date": date,
            "appointment_time": time,
            "reason": "checkup",
        })),
    )
    .await
}

/// Book + approve + consult, returning (appointment_id, consultation_id).
async fn consultation_fixture(env: &TestEnv, clinic: &Clinic, slot: &str) -> (String, String) {
    let (status, body) = book(env, clinic, &clinic.patient_token, "2024-06-01", slot).await;
    assert_eq!(status, StatusCode::OK, "booking failed: {body}");
    let appointment_id = body["appointment"]["id"].as_str().unwrap().to_string();

    let (status, _) = env
        .request(
            "PUT",
            &format!("/api/appointments/{appointment_id}/decision"),
            Some(&clinic.doctor_token),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = env
        .request(
            "POST",
            "/api/consultations",
            Some(&clinic.doctor_token),
            Some(json!({
                "appointment_id": appointment_id,
                "diagnosis": "hypertension",
                "requires_lab_test": true,
                "requires_prescription": true,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "consultation failed: {body}");
    let consultation_id = body["consultation"]["id"].as_str().unwrap().to_string();
    (appointment_id, consultation_id)
}

// ── Booking & slots ─────────────────────────────────────────

#[tokio::test]
async fn double_booking_same_slot_conflicts() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;
    let (other_token, _) = env.register("quinn@clinic.test", "patient").await;

    let (status, _) = book(&env, &clinic, &clinic.patient_token, "2024-06-01", "09:00:00").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = book(&env, &clinic, &other_token, "2024-06-01", "09:00:00").await;
    assert_eq!(status, StatusCode::CONFLICT, "expected conflict: {body}");
    assert!(body["error"].as_str().unwrap().contains("booked"));
}

#[tokio::test]
async fn cancelled_slot_can_be_rebooked() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;
    let (other_token, _) = env.register("quinn@clinic.test", "patient").await;

    let (_, body) = book(&env, &clinic, &clinic.patient_token, "2024-06-01", "10:00:00").await;
    let appointment_id = body["appointment"]["id"].as_str().unwrap();

    let (status, _) = env
        .request(
            "PUT",
            &format!("/api/appointments/{appointment_id}/cancel"),
            Some(&clinic.patient_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = book(&env, &clinic, &other_token, "2024-06-01", "10:00:00").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn available_slots_subtract_pending_and_approved_only() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;

    let uri = format!(
        "/api/appointments/slots?doctor_id={}&date=2024-06-01",
        clinic.doctor_id
    );

    let (status, body) = env
        .request("GET", &uri, Some(&clinic.patient_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let slots = body["available_slots"].as_array().unwrap();
    assert_eq!(slots.len(), 60);
    assert_eq!(slots[0], "08:00:00");
    assert_eq!(slots[59], "17:50:00");

    // A pending booking blocks exactly its own marker.
    book(&env, &clinic, &clinic.patient_token, "2024-06-01", "09:00:00").await;
    let (_, body) = env
        .request("GET", &uri, Some(&clinic.patient_token), None)
        .await;
    let slots: Vec<&str> = body["available_slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(slots.len(), 59);
    assert!(!slots.contains(&"09:00:00"));
    assert!(slots.contains(&"09:10:00"));

    // A cancelled booking releases its marker.
    let (_, booked) = book(&env, &clinic, &clinic.patient_token, "2024-06-01", "11:00:00").await;
    let appointment_id = booked["appointment"]["id"].as_str().unwrap();
    env.request(
        "PUT",
        &format!("/api/appointments/{appointment_id}/cancel"),
        Some(&clinic.patient_token),
        None,
    )
    .await;
    let (_, body) = env
        .request("GET", &uri, Some(&clinic.patient_token), None)
        .await;
    assert_eq!(body["available_slots"].as_array().unwrap().len(), 59);
}

#[tokio::test]
async fn doctors_cannot_book_and_patients_book_only_themselves() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;

    let (status, _) = book(&env, &clinic, &clinic.doctor_token, "2024-06-01", "09:00:00").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The server forces the authenticated caller as the patient.
    let (_, body) = book(&env, &clinic, &clinic.patient_token, "2024-06-01", "09:00:00").await;
    assert_eq!(
        body["appointment"]["patient_id"].as_str().unwrap(),
        clinic.patient_id
    );
}

#[tokio::test]
async fn booking_notifies_doctor_and_decision_notifies_patient() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;

    let (_, booked) = book(&env, &clinic, &clinic.patient_token, "2024-06-01", "09:00:00").await;
    let appointment_id = booked["appointment"]["id"].as_str().unwrap();

    let (_, inbox) = env
        .request("GET", "/api/notifications", Some(&clinic.doctor_token), None)
        .await;
    let inbox = inbox.as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["type"], "appointment_booked");

    let (status, _) = env
        .request(
            "PUT",
            &format!("/api/appointments/{appointment_id}/decision"),
            Some(&clinic.doctor_token),
            Some(json!({"status": "rejected", "rejection_reason": "fully booked"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, inbox) = env
        .request("GET", "/api/notifications", Some(&clinic.patient_token), None)
        .await;
    let inbox = inbox.as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["type"], "appointment_rejected");
    assert!(inbox[0]["message"].as_str().unwrap().contains("fully booked"));
}

#[tokio::test]
async fn rejection_requires_a_reason_and_decisions_need_pending() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;

    let (_, booked) = book(&env, &clinic, &clinic.patient_token, "2024-06-01", "09:00:00").await;
    let appointment_id = booked["appointment"]["id"].as_str().unwrap();
    let uri = format!("/api/appointments/{appointment_id}/decision");

    let (status, body) = env
        .request(
            "PUT",
            &uri,
            Some(&clinic.doctor_token),
            Some(json!({"status": "rejected"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("reason"));

    let (status, _) = env
        .request(
            "PUT",
            &uri,
            Some(&clinic.doctor_token),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Already approved: a second decision is an invalid state.
    let (status, _) = env
        .request(
            "PUT",
            &uri,
            Some(&clinic.doctor_token),
            Some(json!({"status": "rejected", "rejection_reason": "changed my mind"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patients_only_see_their_own_appointments() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;
    let (other_token, _) = env.register("quinn@clinic.test", "patient").await;

    book(&env, &clinic, &clinic.patient_token, "2024-06-01", "09:00:00").await;
    book(&env, &clinic, &other_token, "2024-06-01", "09:10:00").await;

    let (_, mine) = env
        .request("GET", "/api/appointments", Some(&clinic.patient_token), None)
        .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, doctors_view) = env
        .request("GET", "/api/appointments", Some(&clinic.doctor_token), None)
        .await;
    assert_eq!(doctors_view.as_array().unwrap().len(), 2);

    let (_, admins_view) = env
        .request("GET", "/api/appointments", Some(&clinic.admin), None)
        .await;
    assert_eq!(admins_view.as_array().unwrap().len(), 2);
}

// ── Consultations ───────────────────────────────────────────

#[tokio::test]
async fn consultation_completes_appointment_and_copies_references() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;
    let (appointment_id, consultation_id) = consultation_fixture(&env, &clinic, "09:00:00").await;

    let (_, view) = env
        .request(
            "GET",
            &format!("/api/consultations/{consultation_id}"),
            Some(&clinic.patient_token),
            None,
        )
        .await;
    assert_eq!(view["consultation"]["patient_id"], clinic.patient_id.as_str());
    assert_eq!(view["consultation"]["doctor_id"], clinic.doctor_id.as_str());
    assert_eq!(view["appointment"]["id"], appointment_id.as_str());
    assert_eq!(view["appointment"]["status"], "completed");
}

#[tokio::test]
async fn second_consultation_for_one_appointment_conflicts() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;
    let (appointment_id, _) = consultation_fixture(&env, &clinic, "09:00:00").await;

    let (status, body) = env
        .request(
            "POST",
            "/api/consultations",
            Some(&clinic.doctor_token),
            Some(json!({"appointment_id": appointment_id})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "expected conflict: {body}");
}

#[tokio::test]
async fn only_the_assigned_doctor_consults() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;

    let (_, booked) = book(&env, &clinic, &clinic.patient_token, "2024-06-01", "09:00:00").await;
    let appointment_id = booked["appointment"]["id"].as_str().unwrap();

    // A different doctor (with their own role profile) is rejected.
    let (intruder_token, intruder_user) = env.register("other@clinic.test", "doctor").await;
    env.request(
        "POST",
        "/api/doctors",
        Some(&clinic.admin),
        Some(json!({"user_id": intruder_user, "license_number": "LIC-2002"})),
    )
    .await;

    let (status, _) = env
        .request(
            "POST",
            "/api/consultations",
            Some(&intruder_token),
            Some(json!({"appointment_id": appointment_id})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ── Lab tests ───────────────────────────────────────────────

struct LabFixture {
    clinic: Clinic,
    template_id: String,
    consultation_id: String,
    technician_token: String,
}

async fn setup_lab(env: &TestEnv) -> LabFixture {
    let clinic = setup_clinic(env).await;
    let (_, consultation_id) = consultation_fixture(env, &clinic, "09:00:00").await;

    let (_, body) = env
        .request(
            "POST",
            "/api/lab-tests/templates",
            Some(&clinic.admin),
            Some(json!({"name": "Lipid Panel", "price": 2500.0, "category": "blood"})),
        )
        .await;
    let template_id = body["id"].as_str().unwrap().to_string();

    let (technician_token, technician_id) = env.register("tech@clinic.test", "lab_technician").await;
    // Register the technician as the hospital's lab user.
    let (status, _) = env
        .request(
            "PUT",
            &format!("/api/hospitals/{}", clinic.hospital_id),
            Some(&clinic.admin),
            Some(json!({"name": "General Hospital", "lab_user_id": technician_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    LabFixture {
        clinic,
        template_id,
        consultation_id,
        technician_token,
    }
}

#[tokio::test]
async fn lab_request_derives_hospital_from_appointment_chain() {
    let env = TestEnv::new();
    let lab = setup_lab(&env).await;

    let (status, body) = env
        .request(
            "POST",
            "/api/lab-tests/requests",
            Some(&lab.clinic.doctor_token),
            Some(json!({
                "consultation_id": lab.consultation_id,
                "lab_test_template_id": lab.template_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "request failed: {body}");
    assert_eq!(body["request"]["hospital_id"], lab.clinic.hospital_id.as_str());
    assert_eq!(body["request"]["status"], "awaiting_payment");
    // Price defaults to the template's.
    assert_eq!(body["request"]["total_price"], 2500.0);
}

#[tokio::test]
async fn technician_scope_is_their_hospitals_and_result_completes_request() {
    let env = TestEnv::new();
    let lab = setup_lab(&env).await;

    let (_, body) = env
        .request(
            "POST",
            "/api/lab-tests/requests",
            Some(&lab.clinic.doctor_token),
            Some(json!({
                "consultation_id": lab.consultation_id,
                "lab_test_template_id": lab.template_id,
                "status": "pending",
            })),
        )
        .await;
    let request_id = body["request"]["id"].as_str().unwrap().to_string();

    // The covering technician sees it; an unassigned one sees nothing.
    let (_, visible) = env
        .request(
            "GET",
            "/api/lab-tests/requests",
            Some(&lab.technician_token),
            None,
        )
        .await;
    assert_eq!(visible.as_array().unwrap().len(), 1);

    let (idle_token, _) = env.register("idle-tech@clinic.test", "lab_technician").await;
    let (status, visible) = env
        .request("GET", "/api/lab-tests/requests", Some(&idle_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(visible.as_array().unwrap().len(), 0);

    // Recording the result flips the request to completed.
    let (status, body) = env
        .request(
            "POST",
            "/api/lab-tests/results",
            Some(&lab.technician_token),
            Some(json!({
                "lab_test_request_id": request_id,
                "result_status": "negative",
                "result_data": "LDL 98 mg/dL",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "result failed: {body}");
    assert_eq!(body["request"]["status"], "completed");

    // One result per request.
    let (status, _) = env
        .request(
            "POST",
            "/api/lab-tests/results",
            Some(&lab.technician_token),
            Some(json!({
                "lab_test_request_id": request_id,
                "result_status": "positive",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn only_lab_technicians_record_results() {
    let env = TestEnv::new();
    let lab = setup_lab(&env).await;

    let (_, body) = env
        .request(
            "POST",
            "/api/lab-tests/requests",
            Some(&lab.clinic.doctor_token),
            Some(json!({
                "consultation_id": lab.consultation_id,
                "lab_test_template_id": lab.template_id,
            })),
        )
        .await;
    let request_id = body["request"]["id"].as_str().unwrap();

    let (status, _) = env
        .request(
            "POST",
            "/api/lab-tests/results",
            Some(&lab.clinic.doctor_token),
            Some(json!({
                "lab_test_request_id": request_id,
                "result_status": "negative",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ── Prescriptions ───────────────────────────────────────────

struct PharmacyFixture {
    clinic: Clinic,
    consultation_id: String,
    med_a: String,
    med_b: String,
    pharmacy_id: String,
    pharmacist_token: String,
}

async fn setup_pharmacy(env: &TestEnv) -> PharmacyFixture {
    let clinic = setup_clinic(env).await;
    let (_, consultation_id) = consultation_fixture(env, &clinic, "09:00:00").await;

    let (_, body) = env
        .request(
            "POST",
            "/api/medications",
            Some(&clinic.admin),
            Some(json!({"name": "Amlodipine", "unit_price": 500.0})),
        )
        .await;
    let med_a = body["id"].as_str().unwrap().to_string();
    let (_, body) = env
        .request(
            "POST",
            "/api/medications",
            Some(&clinic.admin),
            Some(json!({"name": "Atorvastatin", "unit_price": 1200.0})),
        )
        .await;
    let med_b = body["id"].as_str().unwrap().to_string();

    let (pharmacist_token, pharmacist_id) = env.register("pharm@clinic.test", "pharmacist").await;
    let (_, body) = env
        .request(
            "POST",
            "/api/pharmacies",
            Some(&clinic.admin),
            Some(json!({"name": "Corner Pharmacy", "pharmacist_id": pharmacist_id})),
        )
        .await;
    let pharmacy_id = body["id"].as_str().unwrap().to_string();

    PharmacyFixture {
        clinic,
        consultation_id,
        med_a,
        med_b,
        pharmacy_id,
        pharmacist_token,
    }
}

#[tokio::test]
async fn prescription_batch_fans_out_one_row_per_item() {
    let env = TestEnv::new();
    let fx = setup_pharmacy(&env).await;

    let (status, body) = env
        .request(
            "POST",
            "/api/prescriptions",
            Some(&fx.clinic.doctor_token),
            Some(json!({
                "consultation_id": fx.consultation_id,
                "items": [
                    {"medication_id": fx.med_a, "quantity": 2, "dosage": "5mg daily"},
                    {"medication_id": fx.med_b, "quantity": 1, "dosage": "20mg nightly"},
                ],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "batch failed: {body}");
    assert_eq!(body["count"], 2);
    let rows = body["prescriptions"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["total_price"], 1000.0);
    assert_eq!(rows[1]["total_price"], 1200.0);
    assert_eq!(rows[0]["patient_id"], fx.clinic.patient_id.as_str());
}

#[tokio::test]
async fn invalid_batch_item_writes_nothing_and_names_the_index() {
    let env = TestEnv::new();
    let fx = setup_pharmacy(&env).await;

    let (status, body) = env
        .request(
            "POST",
            "/api/prescriptions",
            Some(&fx.clinic.doctor_token),
            Some(json!({
                "consultation_id": fx.consultation_id,
                "items": [
                    {"medication_id": fx.med_a, "quantity": 2, "dosage": "5mg daily"},
                    {"medication_id": fx.med_b, "quantity": 0, "dosage": "20mg nightly"},
                ],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("item 1"));

    // Nothing was created.
    let (_, mine) = env
        .request(
            "GET",
            "/api/prescriptions",
            Some(&fx.clinic.patient_token),
            None,
        )
        .await;
    assert_eq!(mine.as_array().unwrap().len(), 0);

    // Empty list is rejected outright.
    let (status, _) = env
        .request(
            "POST",
            "/api/prescriptions",
            Some(&fx.clinic.doctor_token),
            Some(json!({"consultation_id": fx.consultation_id, "items": []})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pharmacy_assignment_is_idempotent_per_pair() {
    let env = TestEnv::new();
    let fx = setup_pharmacy(&env).await;

    let (_, body) = env
        .request(
            "POST",
            "/api/prescriptions",
            Some(&fx.clinic.doctor_token),
            Some(json!({
                "consultation_id": fx.consultation_id,
                "items": [{"medication_id": fx.med_a, "quantity": 1, "dosage": "5mg"}],
            })),
        )
        .await;
    let rx_id = body["prescriptions"][0]["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let (status, body) = env
            .request(
                "PUT",
                &format!("/api/prescriptions/{rx_id}"),
                Some(&fx.clinic.patient_token),
                Some(json!({"pharmacy_id": fx.pharmacy_id})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "assignment failed: {body}");
    }

    let (_, queue) = env
        .request(
            "GET",
            "/api/pharmacy-requests",
            Some(&fx.pharmacist_token),
            None,
        )
        .await;
    assert_eq!(queue.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn pharmacist_decides_requests_for_their_pharmacy() {
    let env = TestEnv::new();
    let fx = setup_pharmacy(&env).await;

    let (_, body) = env
        .request(
            "POST",
            "/api/prescriptions",
            Some(&fx.clinic.doctor_token),
            Some(json!({
                "consultation_id": fx.consultation_id,
                "items": [{"medication_id": fx.med_a, "quantity": 1, "dosage": "5mg"}],
            })),
        )
        .await;
    let rx_id = body["prescriptions"][0]["id"].as_str().unwrap().to_string();

    env.request(
        "PUT",
        &format!("/api/prescriptions/{rx_id}"),
        Some(&fx.clinic.patient_token),
        Some(json!({"pharmacy_id": fx.pharmacy_id})),
    )
    .await;

    let (_, queue) = env
        .request(
            "GET",
            "/api/pharmacy-requests",
            Some(&fx.pharmacist_token),
            None,
        )
        .await;
    let request_id = queue[0]["request"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/pharmacy-requests/{request_id}/decision");

    // The patient cannot decide it.
    let (status, _) = env
        .request(
            "PUT",
            &uri,
            Some(&fx.clinic.patient_token),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Rejection needs a reason.
    let (status, _) = env
        .request(
            "PUT",
            &uri,
            Some(&fx.pharmacist_token),
            Some(json!({"status": "rejected"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Approve, then complete.
    let (status, _) = env
        .request(
            "PUT",
            &uri,
            Some(&fx.pharmacist_token),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = env
        .request(
            "PUT",
            &uri,
            Some(&fx.pharmacist_token),
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "completed");
}

// ── Payments ────────────────────────────────────────────────

#[tokio::test]
async fn payment_without_insurance_pays_everything() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;
    let (_, consultation_id) = consultation_fixture(&env, &clinic, "09:00:00").await;

    let (status, body) = env
        .request(
            "POST",
            "/api/payments",
            Some(&clinic.patient_token),
            Some(json!({
                "payment_type": "consultation",
                "reference_id": consultation_id,
                "amount": 5000.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "payment failed: {body}");
    assert_eq!(body["insurance_coverage"], 0.0);
    assert_eq!(body["patient_pays"], 5000.0);
    assert_eq!(body["status"], "completed");
    assert!(body["transaction_id"].is_string());
}

#[tokio::test]
async fn payment_with_insurance_splits_the_amount() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;
    let (_, consultation_id) = consultation_fixture(&env, &clinic, "09:00:00").await;

    let (_, ins) = env
        .request(
            "POST",
            "/api/insurances",
            Some(&clinic.admin),
            Some(json!({"name": "BlueShield", "coverage_percentage": 30.0})),
        )
        .await;
    let insurance_id = ins["id"].as_str().unwrap();

    let (status, _) = env
        .request(
            "PUT",
            &format!("/api/profiles/{}", clinic.patient_id),
            Some(&clinic.patient_token),
            Some(json!({"insurance_id": insurance_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = env
        .request(
            "POST",
            "/api/payments",
            Some(&clinic.patient_token),
            Some(json!({
                "payment_type": "lab_test",
                "reference_id": consultation_id,
                "amount": 5000.0,
            })),
        )
        .await;
    assert_eq!(body["insurance_coverage"], 1500.0);
    assert_eq!(body["patient_pays"], 3500.0);
}

#[tokio::test]
async fn only_patients_create_payments() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;
    let (_, consultation_id) = consultation_fixture(&env, &clinic, "09:00:00").await;

    let (status, _) = env
        .request(
            "POST",
            "/api/payments",
            Some(&clinic.doctor_token),
            Some(json!({
                "payment_type": "consultation",
                "reference_id": consultation_id,
                "amount": 5000.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ── Notifications ───────────────────────────────────────────

#[tokio::test]
async fn notification_inbox_is_strictly_per_user() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;

    book(&env, &clinic, &clinic.patient_token, "2024-06-01", "09:00:00").await;

    let (_, inbox) = env
        .request("GET", "/api/notifications", Some(&clinic.doctor_token), None)
        .await;
    let note_id = inbox[0]["id"].as_str().unwrap().to_string();

    let (_, count) = env
        .request(
            "GET",
            "/api/notifications/unread-count",
            Some(&clinic.doctor_token),
            None,
        )
        .await;
    assert_eq!(count["unread"], 1);

    // The patient cannot mark the doctor's notification read.
    let (status, _) = env
        .request(
            "PUT",
            &format!("/api/notifications/{note_id}/read"),
            Some(&clinic.patient_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = env
        .request(
            "PUT",
            &format!("/api/notifications/{note_id}/read"),
            Some(&clinic.doctor_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_read"], true);

    let (_, count) = env
        .request(
            "GET",
            "/api/notifications/unread-count",
            Some(&clinic.doctor_token),
            None,
        )
        .await;
    assert_eq!(count["unread"], 0);
}

// ── Vitals ──────────────────────────────────────────────────

#[tokio::test]
async fn nurses_record_vitals_and_scopes_hold() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;

    let (nurse_token, nurse_user) = env.register("florence@clinic.test", "nurse").await;
    env.request(
        "POST",
        "/api/nurses",
        Some(&clinic.admin),
        Some(json!({"user_id": nurse_user, "license_number": "RN-42"})),
    )
    .await;

    // Patients cannot record vitals.
    let (status, _) = env
        .request(
            "POST",
            "/api/vitals",
            Some(&clinic.patient_token),
            Some(json!({"patient_id": clinic.patient_id, "heart_rate": 60.0})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = env
        .request(
            "POST",
            "/api/vitals",
            Some(&nurse_token),
            Some(json!({
                "patient_id": clinic.patient_id,
                "blood_pressure": "120/80",
                "heart_rate": 62.0,
                "temperature": 36.6,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "vital failed: {body}");
    assert_eq!(body["nurse"]["id"], nurse_user.as_str());

    let (_, mine) = env
        .request("GET", "/api/vitals", Some(&clinic.patient_token), None)
        .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, recorded) = env
        .request("GET", "/api/vitals", Some(&nurse_token), None)
        .await;
    assert_eq!(recorded.as_array().unwrap().len(), 1);

    let (_, unrelated) = env
        .request("GET", "/api/vitals", Some(&clinic.doctor_token), None)
        .await;
    assert_eq!(unrelated.as_array().unwrap().len(), 0);
}

// ── Catalog gates ───────────────────────────────────────────

#[tokio::test]
async fn catalog_mutation_is_role_gated() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;

    let (status, _) = env
        .request(
            "POST",
            "/api/hospitals",
            Some(&clinic.patient_token),
            Some(json!({"name": "Rogue Hospital"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = env
        .request(
            "POST",
            "/api/hospital-departments",
            Some(&clinic.admin),
            Some(json!({
                "hospital_id": clinic.hospital_id,
                "department_id": clinic.department_id,
                "consultation_fee": 3000.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The (hospital, department) pair is unique.
    let (status, _) = env
        .request(
            "POST",
            "/api/hospital-departments",
            Some(&clinic.admin),
            Some(json!({
                "hospital_id": clinic.hospital_id,
                "department_id": clinic.department_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Duplicate license numbers conflict too.
    let (_, other_doctor) = env.register("dr2@clinic.test", "doctor").await;
    let (status, _) = env
        .request(
            "POST",
            "/api/doctors",
            Some(&clinic.admin),
            Some(json!({"user_id": other_doctor, "license_number": "LIC-1001"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn profile_reads_pass_the_ownership_gate() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;

    let uri = format!("/api/profiles/{}", clinic.patient_id);

    let (status, _) = env
        .request("GET", &uri, Some(&clinic.patient_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = env.request("GET", &uri, Some(&clinic.admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = env
        .request("GET", &uri, Some(&clinic.doctor_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Only admins list profiles.
    let (status, _) = env
        .request("GET", "/api/profiles", Some(&clinic.patient_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleted_profile_token_is_unauthenticated() {
    let env = TestEnv::new();
    let clinic = setup_clinic(&env).await;

    let (status, _) = env
        .request(
            "DELETE",
            &format!("/api/profiles/{}", clinic.patient_id),
            Some(&clinic.admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = env
        .request("GET", "/api/auth/me", Some(&clinic.patient_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
