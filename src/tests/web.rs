use crate::{
    fixtures, router,
    routes::sse::SseEvent,
    tests::fake_api::{FakeApi, state_for},
};
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use tower::ServiceExt; // for .oneshot()

struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    Response {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn form(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(Method::DELETE)
        .body(Body::empty())
        .unwrap()
}

async fn seeded() -> (FakeApi, Router) {
    let fake = FakeApi::spawn().await;
    let state = fake.state();
    fixtures::seed(state.api()).await.unwrap();
    (fake, router(state))
}

#[tokio::test]
async fn seeding_loads_the_whole_cohort() {
    let fake = FakeApi::spawn().await;
    let app = router(fake.state());

    let response = send(&app, form(Method::POST, "/internal/seed", "")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Sample data added"));
    assert!(response.body.contains(r#"hx-swap-oob="true""#));

    let store = fake.store();
    assert_eq!(store.students.len(), 10);
    assert_eq!(store.modules.len(), 6);
    // 10 students x 2 mandatory modules, plus the optional ones
    assert_eq!(store.registrations.len(), 20 + 28);
    assert_eq!(store.grades.len(), 48);
}

#[tokio::test]
async fn reseeding_stops_at_the_existing_registrations() {
    let (fake, app) = seeded().await;

    // students and modules are saved over, then the registrations are refused
    let response = send(&app, form(Method::POST, "/internal/seed", "")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.headers["HX-Retarget"], "#error_banner");
    assert!(response.body.contains("Error adding fake data"));

    let store = fake.store();
    assert_eq!(store.students.len(), 10);
    assert_eq!(store.modules.len(), 6);
    assert_eq!(store.registrations.len(), 48);
    assert_eq!(store.grades.len(), 48);
}

#[tokio::test]
async fn home_page_and_prefix_search() {
    let (_fake, app) = seeded().await;

    let home = send(&app, get("/")).await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Student Grade Management"));
    assert!(home.body.contains(r#"id="error_banner""#));

    let search = send(&app, get("/internal/search?q=p")).await;
    assert!(search.body.contains("Maya Patel"));
    assert!(search.body.contains("Priya Shah"));
    assert!(search.body.contains("Probability &amp; Statistics"));
    assert!(!search.body.contains("Oliver Reed"));

    // substrings in the middle of a name don't count
    let search = send(&app, get("/internal/search?q=atel")).await;
    assert!(search.body.contains("No matches"));

    let empty = send(&app, get("/internal/search?q=")).await;
    assert!(empty.body.is_empty());
}

#[tokio::test]
async fn student_list_filters_and_sorts() {
    let (_fake, app) = seeded().await;

    let filtered = send(&app, get("/internal/students?filter=PAT")).await;
    assert!(filtered.body.contains("maya.patel"));
    assert!(!filtered.body.contains("oliver.reed"));

    let ascending = send(&app, get("/internal/students")).await;
    let first = ascending.body.find("oliver.reed").unwrap();
    let last = ascending.body.find("hugo.fernandes").unwrap();
    assert!(first < last);
    assert!(ascending.body.contains("Student ID ▲"));

    let descending = send(
        &app,
        get("/internal/students?sort=id&direction=asc&toggle=id"),
    )
    .await;
    let first = descending.body.find("oliver.reed").unwrap();
    let last = descending.body.find("hugo.fernandes").unwrap();
    assert!(last < first);
    assert!(descending.body.contains("Student ID ▼"));
}

#[tokio::test]
async fn adding_a_student_validates_and_announces_itself() {
    let (fake, _) = seeded().await;
    let state = fake.state();
    let mut feed = state.subscribe_to_sse_feed();
    let app = router(state);

    let bad_id = send(
        &app,
        form(
            Method::PUT,
            "/internal/students/new",
            "id=eleven&username=sam.lee&email=sam.lee%40example.com&first_name=Sam&last_name=Lee",
        ),
    )
    .await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert!(bad_id.body.contains("Student ID must be a number"));

    let bad_email = send(
        &app,
        form(
            Method::PUT,
            "/internal/students/new",
            "id=11&username=sam.lee&email=sam.lee&first_name=Sam&last_name=Lee",
        ),
    )
    .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert!(bad_email.body.contains("Invalid email address"));
    assert!(feed.try_recv().is_err());

    let added = send(
        &app,
        form(
            Method::PUT,
            "/internal/students/new",
            "id=11&username=sam.lee&email=sam.lee%40example.com&first_name=Sam&last_name=Lee",
        ),
    )
    .await;
    assert_eq!(added.status, StatusCode::OK);
    assert!(added.body.contains("Added Sam Lee"));
    assert_eq!(feed.try_recv().unwrap(), SseEvent::CrudStudent);

    let store = fake.store();
    assert!(store.students.iter().any(|s| s.id == 11));
    assert!(store.is_registered(11, "COMP0010"));
    assert!(store.is_registered(11, "MATH0021"));
}

#[tokio::test]
async fn student_detail_and_unregistering() {
    let (fake, app) = seeded().await;

    let detail = send(&app, get("/student/1")).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert!(detail.body.contains("Oliver Reed"));
    // 78, 72, 74, 68, 63
    assert!(detail.body.contains("71.00"));

    let compulsory = send(&app, delete("/student/1/modules/COMP0010")).await;
    assert_eq!(compulsory.status, StatusCode::BAD_REQUEST);
    assert!(
        compulsory
            .body
            .contains("Cannot unregister from a compulsory module!")
    );
    assert!(fake.store().is_registered(1, "COMP0010"));

    let optional = send(&app, delete("/student/1/modules/ECON0014")).await;
    assert_eq!(optional.status, StatusCode::OK);
    assert!(!optional.body.contains("ECON0014"));
    assert!(!fake.store().is_registered(1, "ECON0014"));

    let missing = send(&app, get("/student/404")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(missing.body.contains("Student not found"));
}

#[tokio::test]
async fn editing_a_student_keeps_their_id() {
    let (fake, app) = seeded().await;

    let edit_form = send(&app, get("/internal/student/1/edit")).await;
    assert_eq!(edit_form.status, StatusCode::OK);
    assert!(edit_form.body.contains(r#"hx-put="/internal/student/1/edit""#));
    assert!(edit_form.body.contains(r#"name="id" value="1" readonly"#));
    assert!(edit_form.body.contains(r#"value="oliver.reed""#));
    assert!(edit_form.body.contains(r#"value="Reed""#));
    assert!(edit_form.body.contains("Save Changes"));

    let saved = send(
        &app,
        form(
            Method::PUT,
            "/internal/student/1/edit",
            "id=99&username=oliver.reid&email=oliver.reid%40example.com&first_name=Oliver&last_name=Reid",
        ),
    )
    .await;
    assert_eq!(saved.status, StatusCode::OK);
    assert!(saved.body.contains("Saved Oliver Reid"));
    assert!(saved.body.contains(r#"id="student_sections""#));
    assert!(saved.body.contains(r#"hx-swap-oob="true""#));

    {
        let store = fake.store();
        assert_eq!(store.students.len(), 10);
        assert!(store.students.iter().all(|s| s.id != 99));
        let student = store.students.iter().find(|s| s.id == 1).unwrap();
        assert_eq!(student.username, "oliver.reid");
        assert_eq!(student.last_name, "Reid");
        // the saved student replaces the copies inside their registrations
        let registrations: Vec<_> = store
            .registrations
            .iter()
            .filter(|r| r.student.id == 1)
            .collect();
        assert_eq!(registrations.len(), 5);
        assert!(registrations.iter().all(|r| r.student.last_name == "Reid"));
    }

    let missing = send(&app, get("/internal/student/404/edit")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    let missing = send(
        &app,
        form(
            Method::PUT,
            "/internal/student/404/edit",
            "id=404&username=nobody&email=nobody%40example.com&first_name=No&last_name=Body",
        ),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(fake.store().students.iter().all(|s| s.id != 404));
}

#[tokio::test]
async fn editing_a_module_can_make_it_mandatory() {
    let (fake, app) = seeded().await;

    let mandatory = send(&app, get("/internal/module/COMP0010/edit")).await;
    assert!(mandatory.body.contains(r#"name="code" value="COMP0010" readonly"#));
    assert!(mandatory.body.contains(" checked"));

    let optional = send(&app, get("/internal/module/PHYS0011/edit")).await;
    assert!(optional.body.contains(r#"value="Classical Mechanics""#));
    assert!(!optional.body.contains(" checked"));

    let saved = send(
        &app,
        form(
            Method::PUT,
            "/internal/module/PHYS0011/edit",
            "code=NOPE0000&name=Mechanics&mnc=on",
        ),
    )
    .await;
    assert_eq!(saved.status, StatusCode::OK);
    assert!(saved.body.contains("Saved Mechanics"));
    assert!(saved.body.contains(r#"id="module_sections""#));

    {
        let store = fake.store();
        assert!(store.modules.iter().all(|m| m.code != "NOPE0000"));
        let module = store.modules.iter().find(|m| m.code == "PHYS0011").unwrap();
        assert!(module.mnc);
        assert_eq!(module.name, "Mechanics");
        assert!(store.students.iter().all(|s| store.is_registered(s.id, "PHYS0011")));
    }

    let missing = send(&app, get("/internal/module/NOPE0000/edit")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detail_pages_open_the_grade_form_per_row() {
    let (_fake, app) = seeded().await;

    let student = send(&app, get("/student/2")).await;
    assert!(student.body.contains("Edit Profile"));
    assert!(student.body.contains(
        r##"hx-get="/internal/grades/new?student_id=2&amp;module_code=PHYS0011" hx-target="#in_focus">Edit Grade"##
    ));

    send(
        &app,
        form(
            Method::POST,
            "/module/PHYS0011/register",
            "selected=1",
        ),
    )
    .await;
    let module = send(&app, get("/module/PHYS0011")).await;
    assert!(module.body.contains("Edit Module"));
    assert!(module.body.contains(
        r##"hx-get="/internal/grades/new?student_id=1&amp;module_code=PHYS0011" hx-target="#in_focus">Add Grade"##
    ));
    assert!(module.body.contains(
        r##"hx-get="/internal/grades/new?student_id=2&amp;module_code=PHYS0011" hx-target="#in_focus">Edit Grade"##
    ));

    // the button's target comes back prefilled
    let grade_form = send(
        &app,
        get("/internal/grades/new?student_id=2&module_code=PHYS0011"),
    )
    .await;
    assert!(grade_form.body.contains(r#"option value="2" selected"#));
    assert!(grade_form.body.contains(r#"value="PHYS0011" selected"#));
    assert!(grade_form.body.contains(r#"value="29""#));
    assert!(grade_form.body.contains("Update Grade"));
}

#[tokio::test]
async fn a_grade_has_its_own_page() {
    let (fake, app) = seeded().await;
    let id = fake
        .store()
        .grades
        .iter()
        .find(|g| g.student.id == 2 && g.module.code == "PHYS0011")
        .and_then(|g| g.id)
        .unwrap();

    let page = send(&app, get(&format!("/grade/{id}"))).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains(&format!("Grade {id}")));
    assert!(page.body.contains("29 (fail)"));
    assert!(page.body.contains("Maya Patel (2)"));
    assert!(page.body.contains("Classical Mechanics (PHYS0011)"));
    assert!(page.body.contains("Edit Grade"));

    let listed = send(&app, get("/internal/grades")).await;
    assert!(listed.body.contains(&format!(r#"href="/grade/{id}""#)));

    let missing = send(&app, get("/grade/99999")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(missing.body.contains("Grade not found"));
}

#[tokio::test]
async fn deleting_from_the_detail_page_redirects_to_the_list() {
    let (fake, app) = seeded().await;

    let from_list = send(&app, delete("/students/4")).await;
    assert_eq!(from_list.status, StatusCode::OK);
    assert!(!from_list.headers.contains_key("HX-Redirect"));

    let from_detail = send(&app, delete("/students/5?from_detail=true")).await;
    assert_eq!(from_detail.headers["HX-Redirect"], "/students");

    let store = fake.store();
    assert!(store.students.iter().all(|s| s.id != 4 && s.id != 5));
}

#[tokio::test]
async fn module_detail_flags_failing_averages() {
    let (fake, app) = seeded().await;

    let added = send(
        &app,
        form(
            Method::PUT,
            "/internal/modules/new",
            "code=HIST0001&name=Modern+History",
        ),
    )
    .await;
    assert_eq!(added.status, StatusCode::OK);
    assert!(!fake.store().modules.iter().any(|m| m.code == "HIST0001" && m.mnc));

    // 29, 91, 58, 73, 55
    let passing = send(&app, get("/module/PHYS0011")).await;
    assert!(passing.body.contains("61.20"));
    assert!(!passing.body.contains("(failing)"));

    let ungraded = send(&app, get("/module/HIST0001")).await;
    assert_eq!(ungraded.status, StatusCode::OK);
    assert!(ungraded.body.contains("0.00"));
    assert!(ungraded.body.contains("(failing)"));

    let compulsory = send(&app, delete("/module/MATH0021/students/2")).await;
    assert_eq!(compulsory.status, StatusCode::BAD_REQUEST);
    assert!(
        compulsory
            .body
            .contains("Cannot unregister students from a compulsory module!")
    );

    let missing = send(&app, get("/module/NOPE0000")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(missing.body.contains("Module not found"));
}

#[tokio::test]
async fn grade_form_only_offers_registered_modules() {
    let (_fake, app) = seeded().await;

    let options = send(
        &app,
        get("/internal/grades/module_options?student_id=2&module_code=PHYS0011"),
    )
    .await;
    assert!(options.body.contains(r#"value="COMP0034""#));
    assert!(options.body.contains(r#"value="PHYS0011" selected"#));
    assert!(!options.body.contains(r#"value="STAT0035""#));
    assert!(options.body.contains("Current grade: 29"));
    assert!(options.body.contains("Update Grade"));

    send(
        &app,
        form(Method::PUT, "/internal/modules/new", "code=HIST0001&name=Modern+History"),
    )
    .await;
    let registered = send(
        &app,
        form(
            Method::PUT,
            "/internal/registrations/new",
            "student_id=2&module_code=HIST0001",
        ),
    )
    .await;
    assert_eq!(registered.status, StatusCode::OK);

    let fresh = send(
        &app,
        get("/internal/grades/module_options?student_id=2&module_code=HIST0001"),
    )
    .await;
    assert!(fresh.body.contains("Add Grade"));
    assert!(!fresh.body.contains("Update Grade"));
}

#[tokio::test]
async fn grades_are_validated_then_upserted() {
    let (fake, app) = seeded().await;

    let not_a_number = send(
        &app,
        form(
            Method::PUT,
            "/internal/grades/new",
            "student_id=2&module_code=PHYS0011&score=ninety",
        ),
    )
    .await;
    assert_eq!(not_a_number.status, StatusCode::BAD_REQUEST);
    assert!(not_a_number.body.contains("Score must be a number"));

    let too_high = send(
        &app,
        form(
            Method::PUT,
            "/internal/grades/new",
            "student_id=2&module_code=PHYS0011&score=101",
        ),
    )
    .await;
    assert_eq!(too_high.status, StatusCode::BAD_REQUEST);

    let updated = send(
        &app,
        form(
            Method::PUT,
            "/internal/grades/new",
            "student_id=2&module_code=PHYS0011&score=45",
        ),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);

    let store = fake.store();
    assert_eq!(store.grade_for(2, "PHYS0011"), Some(45));
    assert_eq!(store.grades.len(), 48);
}

#[tokio::test]
async fn bulk_registration_locks_linked_rows_and_resubmits_them() {
    let (fake, app) = seeded().await;

    let candidates = send(&app, get("/internal/student/2/register")).await;
    assert!(
        candidates
            .body
            .contains(r#"value="COMP0010" class="leading-tight" checked disabled>"#)
    );
    assert!(
        candidates
            .body
            .contains(r#"value="STAT0035" class="leading-tight">"#)
    );

    // a selection hidden by the filter survives as a hidden input
    let filtered = send(
        &app,
        get("/internal/student/2/register?filter=micro&selected=STAT0035"),
    )
    .await;
    assert!(
        filtered
            .body
            .contains(r#"<input type="hidden" name="selected" value="STAT0035">"#)
    );
    assert!(!filtered.body.contains(r#"value="COMP0034""#));

    let submitted = send(
        &app,
        form(
            Method::POST,
            "/student/2/register",
            "filter=&selected=STAT0035&selected=ECON0014",
        ),
    )
    .await;
    assert_eq!(submitted.status, StatusCode::OK);
    // the four existing registrations are posted again and refused
    assert!(submitted.body.contains("2 of 6 registrations submitted"));
    assert!(submitted.body.contains("This registration already exists."));

    let store = fake.store();
    assert!(store.is_registered(2, "STAT0035"));
    assert!(store.is_registered(2, "ECON0014"));
    assert_eq!(
        store
            .registrations
            .iter()
            .filter(|r| r.student.id == 2)
            .count(),
        6
    );
}

#[tokio::test]
async fn bulk_student_registration_for_a_module() {
    let (fake, app) = seeded().await;

    let candidates = send(&app, get("/internal/module/PHYS0011/register?filter=noor")).await;
    assert!(candidates.body.contains(r#"value="4" class="leading-tight" checked disabled>"#));
    assert!(!candidates.body.contains("Oliver"));

    let submitted = send(
        &app,
        form(Method::POST, "/module/PHYS0011/register", "selected=1&selected=junk"),
    )
    .await;
    assert_eq!(submitted.status, StatusCode::OK);
    assert!(fake.store().is_registered(1, "PHYS0011"));
}

#[tokio::test]
async fn registrations_paginate_and_clamp() {
    let (_fake, app) = seeded().await;

    let first = send(&app, get("/internal/registrations")).await;
    assert!(first.body.contains("Page 1 of 10"));

    let clamped = send(
        &app,
        get("/internal/registrations?rows_per_page=25&page=9"),
    )
    .await;
    assert!(clamped.body.contains("Page 2 of 2"));

    let odd_size = send(&app, get("/internal/registrations?rows_per_page=7")).await;
    assert!(odd_size.body.contains("Page 1 of 10"));
}

#[tokio::test]
async fn changing_rows_per_page_starts_from_the_first_page() {
    let (_fake, app) = seeded().await;

    let third = send(&app, get("/internal/registrations?page=2&rows_per_page=5")).await;
    assert!(third.body.contains("Page 3 of 10"));

    // the select sends page 0 over the included hidden page input
    let select = third
        .body
        .split(r#"name="rows_per_page""#)
        .nth(1)
        .and_then(|rest| rest.split('>').next())
        .unwrap();
    assert!(select.contains(r#"hx-vals="{&quot;page&quot;: &quot;0&quot;}""#));

    let resized = send(&app, get("/internal/registrations?page=0&rows_per_page=10")).await;
    assert!(resized.body.contains("Page 1 of 5"));
}

#[tokio::test]
async fn mandatory_registrations_cannot_be_deleted_from_the_list() {
    let (fake, app) = seeded().await;

    let compulsory = send(&app, delete("/registrations/3/MATH0021")).await;
    assert_eq!(compulsory.status, StatusCode::BAD_REQUEST);

    let optional = send(&app, delete("/registrations/3/PHYS0011")).await;
    assert_eq!(optional.status, StatusCode::OK);
    assert!(!fake.store().is_registered(3, "PHYS0011"));

    let gone = send(&app, delete("/registrations/3/PHYS0011")).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn insights_and_exports() {
    let (_fake, app) = seeded().await;

    let insights = send(&app, get("/insights")).await;
    assert_eq!(insights.status, StatusCode::OK);
    // 95, 92, 94, 90, 88, 91
    assert!(insights.body.contains("Luca Rossi"));
    assert!(insights.body.contains("91.67"));
    assert!(insights.body.contains("Maya Patel"));
    assert!(insights.body.contains("Hugo Fernandes"));

    let failed_table = insights
        .body
        .split("Students Who Failed a Module")
        .nth(1)
        .unwrap();
    assert!(failed_table.contains("Failed Modules"));
    // Hugo's 39 is the only fail in microeconomics
    assert!(failed_table.contains("Introduction to Microeconomics"));
    assert!(!failed_table.contains("Probability &amp; Statistics"));

    let students = send(&app, get("/insights/export/students.csv")).await;
    assert_eq!(students.status, StatusCode::OK);
    assert!(
        students.headers["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let lines: Vec<&str> = students.body.lines().collect();
    assert_eq!(lines[0], "Student ID,First Name,Last Name,Average Grade");
    assert_eq!(lines.len(), 11);
    assert!(lines.contains(&"1,Oliver,Reed,71.00"));

    send(
        &app,
        form(Method::PUT, "/internal/modules/new", "code=HIST0001&name=Modern+History"),
    )
    .await;
    let modules = send(&app, get("/insights/export/modules.csv")).await;
    assert!(modules.body.starts_with("Module Code,Module Name,Average Grade\n"));
    assert!(modules.body.contains("HIST0001,Modern History,N/A"));
}

#[tokio::test]
async fn unreachable_api_shows_a_banner() {
    let app = router(state_for("http://127.0.0.1:1/"));

    let response = send(&app, get("/internal/students")).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.headers["HX-Reswap"], "innerHTML");
    assert!(response.body.contains("Error reaching the grades API"));
}
