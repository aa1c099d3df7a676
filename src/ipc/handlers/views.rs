use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::views;

fn handle_views_teacher(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(teacher_id) = required_str(&req.params, "teacherId") else {
        return err(&req.id, "bad_params", "missing teacherId", None);
    };
    let Some(teacher) = hub.sync.teacher(&teacher_id) else {
        return err(&req.id, "not_found", "teacher not found", None);
    };

    let halaqas = views::halaqas_for_teacher(&hub.sync.halaqas(), &teacher_id);
    // Students are scoped to the selected halaqa, when one is given.
    let students = match req.params.get("halaqaId").and_then(|v| v.as_str()) {
        Some(halaqa_id) => views::students_in_halaqa(&hub.sync.students(), halaqa_id),
        None => Vec::new(),
    };

    ok(
        &req.id,
        json!({
            "teacher": teacher,
            "halaqas": halaqas,
            "students": students
        }),
    )
}

fn handle_views_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(student_id) = required_str(&req.params, "studentId") else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    let Some(student) = hub.sync.student(&student_id) else {
        return err(&req.id, "not_found", "student not found", None);
    };

    let notifications = views::notifications(&student);
    let history = views::sorted_history(&student.progress);
    let stats = views::progress_stats(&student.progress);

    ok(
        &req.id,
        json!({
            "student": {
                "id": student.id,
                "name": student.name,
                "nameAr": student.name_ar,
                "halaqaId": student.halaqa_id
            },
            "notifications": notifications,
            "history": history,
            "stats": stats
        }),
    )
}

fn handle_views_supervisor(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let students = hub.sync.students();
    let halaqas = hub.sync.halaqas();
    let teachers = hub.sync.teachers();

    let roster: Vec<serde_json::Value> = views::roster(&students, &halaqas, &teachers)
        .into_iter()
        .map(|row| {
            json!({
                "student": {
                    "id": row.student.id,
                    "name": row.student.name,
                    "nameAr": row.student.name_ar
                },
                "halaqa": row.halaqa.map(|h| json!({
                    "id": h.id,
                    "name": h.name,
                    "nameAr": h.name_ar
                })),
                "teacher": row.teacher.map(|t| json!({
                    "id": t.id,
                    "name": t.name,
                    "nameAr": t.name_ar
                }))
            })
        })
        .collect();

    let progress = views::all_progress(&students);
    let stats = views::progress_stats(&progress);

    ok(
        &req.id,
        json!({
            "roster": roster,
            "progress": progress,
            "stats": stats
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "views.teacher" => Some(handle_views_teacher(state, req)),
        "views.student" => Some(handle_views_student(state, req)),
        "views.supervisor" => Some(handle_views_supervisor(state, req)),
        _ => None,
    }
}
