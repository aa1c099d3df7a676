use std::cell::RefCell;
use std::rc::Rc;

use crate::error::DataError;
use crate::model::{Halaqa, Period, Student, Teacher};
use crate::store::{self, Document, DocumentStore, SubscriptionId};

/// Live mirror of the four store collections.
///
/// One subscription per collection; each snapshot callback fully replaces the
/// typed in-memory set, so the mirror never patches incrementally. Collections
/// refresh independently of each other: consistency across them is eventual,
/// and a reader may briefly see a halaqa whose teacherId no longer resolves
/// while the dependent snapshot is still in flight. The guard keeps that
/// window transient by refusing the deletes that would make it permanent.
///
/// Readers get cloned snapshots; only the subscription callbacks write.
pub struct EntitySync {
    store: Rc<DocumentStore>,
    periods: Rc<RefCell<Vec<Period>>>,
    halaqas: Rc<RefCell<Vec<Halaqa>>>,
    teachers: Rc<RefCell<Vec<Teacher>>>,
    students: Rc<RefCell<Vec<Student>>>,
    subscriptions: Vec<SubscriptionId>,
}

fn open_mirror<T, F>(
    store: &Rc<DocumentStore>,
    subscriptions: &mut Vec<SubscriptionId>,
    collection: &str,
    cell: &Rc<RefCell<Vec<T>>>,
    normalize: F,
) -> Result<(), DataError>
where
    T: 'static,
    F: Fn(&Document) -> Option<T> + 'static,
{
    let sink = Rc::clone(cell);
    let subscription = store.subscribe(
        collection,
        Box::new(move |docs| {
            *sink.borrow_mut() = docs.iter().filter_map(&normalize).collect();
        }),
    )?;
    subscriptions.push(subscription);
    Ok(())
}

impl EntitySync {
    /// Opens the four subscriptions. The initial snapshots land before this
    /// returns, so the mirror is populated immediately.
    pub fn attach(store: Rc<DocumentStore>) -> Result<EntitySync, DataError> {
        let periods = Rc::new(RefCell::new(Vec::new()));
        let halaqas = Rc::new(RefCell::new(Vec::new()));
        let teachers = Rc::new(RefCell::new(Vec::new()));
        let students = Rc::new(RefCell::new(Vec::new()));

        let mut subscriptions = Vec::with_capacity(4);
        let opened = (|| {
            open_mirror(&store, &mut subscriptions, store::PERIODS, &periods, Period::from_document)?;
            open_mirror(&store, &mut subscriptions, store::HALAQAS, &halaqas, Halaqa::from_document)?;
            open_mirror(&store, &mut subscriptions, store::TEACHERS, &teachers, Teacher::from_document)?;
            open_mirror(&store, &mut subscriptions, store::STUDENTS, &students, Student::from_document)
        })();
        if let Err(e) = opened {
            for subscription in subscriptions {
                store.unsubscribe(subscription);
            }
            return Err(e);
        }

        Ok(EntitySync {
            store,
            periods,
            halaqas,
            teachers,
            students,
            subscriptions,
        })
    }

    /// Releases all four subscriptions. No callback fires afterwards.
    pub fn detach(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            self.store.unsubscribe(subscription);
        }
    }

    pub fn periods(&self) -> Vec<Period> {
        self.periods.borrow().clone()
    }

    pub fn halaqas(&self) -> Vec<Halaqa> {
        self.halaqas.borrow().clone()
    }

    pub fn teachers(&self) -> Vec<Teacher> {
        self.teachers.borrow().clone()
    }

    pub fn students(&self) -> Vec<Student> {
        self.students.borrow().clone()
    }

    pub fn teacher(&self, id: &str) -> Option<Teacher> {
        self.teachers.borrow().iter().find(|t| t.id == id).cloned()
    }

    pub fn student(&self, id: &str) -> Option<Student> {
        self.students.borrow().iter().find(|s| s.id == id).cloned()
    }
}

impl Drop for EntitySync {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn attach_populates_and_tracks_mutations() {
        let workspace = temp_dir("halaqad-sync-attach");
        let store = Rc::new(DocumentStore::open(&workspace).expect("open store"));

        let period_id = store
            .add(store::PERIODS, json!({ "name": "Fall", "nameAr": "الخريف" }))
            .expect("seed period");

        let sync = EntitySync::attach(Rc::clone(&store)).expect("attach");
        let periods = sync.periods();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].id, period_id);
        assert_eq!(periods[0].name, "Fall");

        let teacher_id = store
            .add(store::TEACHERS, json!({ "name": "Ali", "nameAr": "علي" }))
            .expect("add teacher");
        assert_eq!(sync.teachers().len(), 1);
        assert_eq!(sync.teacher(&teacher_id).expect("mirrored").name, "Ali");

        store.delete(store::PERIODS, &period_id).expect("delete period");
        assert!(sync.periods().is_empty());
        // The teachers mirror is untouched by a periods change.
        assert_eq!(sync.teachers().len(), 1);

        let _ = std::fs::remove_dir_all(workspace);
    }

    #[test]
    fn snapshot_fully_replaces_the_collection() {
        let workspace = temp_dir("halaqad-sync-replace");
        let store = Rc::new(DocumentStore::open(&workspace).expect("open store"));
        let sync = EntitySync::attach(Rc::clone(&store)).expect("attach");

        let id = store
            .add(store::TEACHERS, json!({ "name": "Ali", "nameAr": "علي" }))
            .expect("add teacher");
        store
            .update(store::TEACHERS, &id, json!({ "name": "Ali Hassan" }))
            .expect("update teacher");

        let teachers = sync.teachers();
        assert_eq!(teachers.len(), 1);
        assert_eq!(teachers[0].name, "Ali Hassan");

        let _ = std::fs::remove_dir_all(workspace);
    }

    #[test]
    fn detach_stops_all_updates() {
        let workspace = temp_dir("halaqad-sync-detach");
        let store = Rc::new(DocumentStore::open(&workspace).expect("open store"));
        let mut sync = EntitySync::attach(Rc::clone(&store)).expect("attach");

        sync.detach();
        store
            .add(store::PERIODS, json!({ "name": "Fall", "nameAr": "الخريف" }))
            .expect("add period");
        store
            .add(store::STUDENTS, json!({ "name": "Omar", "nameAr": "عمر", "halaqaId": "h", "progress": [] }))
            .expect("add student");

        assert!(sync.periods().is_empty());
        assert!(sync.students().is_empty());

        let _ = std::fs::remove_dir_all(workspace);
    }

    #[test]
    fn students_arrive_with_flattened_progress() {
        let workspace = temp_dir("halaqad-sync-progress");
        let store = Rc::new(DocumentStore::open(&workspace).expect("open store"));
        let sync = EntitySync::attach(Rc::clone(&store)).expect("attach");

        let student_id = store
            .add(
                store::STUDENTS,
                json!({
                    "name": "Omar",
                    "nameAr": "عمر",
                    "halaqaId": "h1",
                    "progress": [{
                        "id": "p1-0",
                        "date": "2024-09-01T10:00:00.000Z",
                        "type": "murajaah",
                        "status": "correct",
                        "surah": "Ya-Sin",
                        "details": "Ya-Sin"
                    }]
                }),
            )
            .expect("add student");

        let student = sync.student(&student_id).expect("mirrored");
        assert_eq!(student.progress.len(), 1);
        assert_eq!(student.progress[0].surah, "Ya-Sin");

        let _ = std::fs::remove_dir_all(workspace);
    }
}
