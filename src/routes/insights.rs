use crate::{
    data::{
        DataType, grade::Grade, module::Module, registration::Registration, student::Student,
    },
    error::{CsvFlushSnafu, CsvSnafu, GradebookResult},
    maud_conveniences::{LINK_BUTTON, card, render_table, subtitle, title},
    state::GradebookState,
    stats::{
        Counts, MODULE_EXPORT_HEADERS, STUDENT_EXPORT_HEADERS, average, display_average,
        failed_modules, failed_students, is_failing_average, module_averages, module_export_rows,
        student_average, student_export_rows, top_student,
    },
};
use axum::{extract::State, http::header, response::IntoResponse};
use maud::{Markup, html};
use snafu::ResultExt;

pub async fn get_insights(State(state): State<GradebookState>) -> GradebookResult<Markup> {
    let api = state.api();
    let (students, modules, grades, registrations) = tokio::try_join!(
        Student::get_all(api),
        Module::get_all(api),
        Grade::get_all(api),
        Registration::get_all(api),
    )?;

    let counts = Counts::new(&students, &modules, &grades, &registrations);
    let overall = average(grades.iter().map(|g| g.score));
    let top = top_student(&students, &grades);

    let count_rows = vec![
        [html! {"Students"}, html! {(counts.students)}],
        [html! {"Modules"}, html! {(counts.modules)}],
        [html! {"Grades"}, html! {(counts.grades)}],
        [html! {"Registrations"}, html! {(counts.registrations)}],
        [html! {"Unregistered Students"}, html! {(counts.unregistered_students)}],
        [html! {"Overall Average Grade"}, html! {(display_average(overall))}],
    ];

    let module_rows = module_averages(&modules, &grades)
        .into_iter()
        .map(|ma| {
            let failing = is_failing_average(ma.average);
            let width = ma.average.unwrap_or_default().clamp(0.0, 100.0);
            [
                html! { a href={"/module/" (ma.module.code)} class="underline" {(ma.module.code)} },
                html! {(ma.module.name)},
                html! { span class=[failing.then_some("text-red-400")] {(display_average(ma.average))} },
                html! {
                    div class="w-48 bg-gray-700 rounded h-3" {
                        div class={"h-3 rounded " (if failing { "bg-red-600" } else { "bg-green-600" })}
                            style={"width: " (format!("{width:.0}")) "%"} {}
                    }
                },
            ]
        })
        .collect();

    let failed_rows = failed_students(&students, &grades)
        .into_iter()
        .map(|student| {
            [
                html! { a href={"/student/" (student.id)} class="underline" {(student.id)} },
                html! {(student)},
                html! {(failed_modules(&grades, student.id).join(", "))},
                html! {(display_average(student_average(&grades, student.id)))},
            ]
        })
        .collect();

    Ok(state.render(html! {
        (card(html! {
            div class="flex flex-row items-center justify-between" {
                (title("Insights"))
                div class="flex flex-row space-x-2" {
                    a href="/insights/export/students.csv" class=(LINK_BUTTON) download { "Export Students CSV" }
                    a href="/insights/export/modules.csv" class=(LINK_BUTTON) download { "Export Modules CSV" }
                }
            }
            (render_table("Overview", ["", "Count"], count_rows))
        }))
        (card(html! {
            (subtitle("Top Student"))
            @match &top {
                Some(top) => {
                    p {
                        a href={"/student/" (top.student.id)} class="underline font-bold" {(top.student)}
                        " with an average of " (display_average(Some(top.average)))
                    }
                }
                None => {
                    p class="text-gray-400" { "No grades yet." }
                }
            }
        }))
        (card(render_table(
            "Module Averages",
            ["Module Code", "Module Name", "Average", ""],
            module_rows,
        )))
        (card(render_table(
            "Students Who Failed a Module",
            ["Student ID", "Name", "Failed Modules", "Average Grade"],
            failed_rows,
        )))
    }))
}

fn csv_response<const N: usize>(
    filename: &'static str,
    headers: [&str; N],
    rows: Vec<[String; N]>,
) -> GradebookResult<impl IntoResponse> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(headers).context(CsvSnafu)?;
    for row in rows {
        writer.write_record(&row).context(CsvSnafu)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(csv::IntoInnerError::into_error)
        .context(CsvFlushSnafu)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

pub async fn export_students_csv(
    State(state): State<GradebookState>,
) -> GradebookResult<impl IntoResponse> {
    let api = state.api();
    let (students, grades) = tokio::try_join!(Student::get_all(api), Grade::get_all(api))?;

    info!(students = students.len(), "exporting student averages");
    csv_response(
        "students.csv",
        STUDENT_EXPORT_HEADERS,
        student_export_rows(&students, &grades),
    )
}

pub async fn export_modules_csv(
    State(state): State<GradebookState>,
) -> GradebookResult<impl IntoResponse> {
    let api = state.api();
    let (modules, grades) = tokio::try_join!(Module::get_all(api), Grade::get_all(api))?;

    info!(modules = modules.len(), "exporting module averages");
    csv_response(
        "modules.csv",
        MODULE_EXPORT_HEADERS,
        module_export_rows(&modules, &grades),
    )
}
