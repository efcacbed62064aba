use customer_core::db::open_db_in_memory;
use customer_core::{
    open_customer_repository, Customer, CustomerId, CustomerPatch, CustomerRegistration,
    CustomerRepository, CustomerService, CustomerServiceError, CustomerUpdate, ErrorKind,
    RepoResult, StorageBackend,
};
use std::cell::{Cell, RefCell};

/// In-memory repository that records every port call in order.
#[derive(Default)]
struct RecordingRepo {
    rows: RefCell<Vec<Customer>>,
    next_id: Cell<CustomerId>,
    calls: RefCell<Vec<&'static str>>,
    updates: RefCell<Vec<CustomerUpdate>>,
}

impl RecordingRepo {
    fn seeded(customers: &[(&str, &str, i32)]) -> Self {
        let repo = Self::default();
        for (name, email, age) in customers {
            repo.insert_customer(&Customer::new(*name, *email, *age))
                .unwrap();
        }
        repo.calls.borrow_mut().clear();
        repo
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }
}

impl CustomerRepository for RecordingRepo {
    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        self.record("list_customers");
        Ok(self.rows.borrow().clone())
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        self.record("get_customer");
        Ok(self
            .rows
            .borrow()
            .iter()
            .find(|row| row.id == Some(id))
            .cloned())
    }

    fn insert_customer(&self, customer: &Customer) -> RepoResult<CustomerId> {
        self.record("insert_customer");
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.rows.borrow_mut().push(Customer {
            id: Some(id),
            ..customer.clone()
        });
        Ok(id)
    }

    fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        self.record("exists_by_email");
        Ok(self.rows.borrow().iter().any(|row| row.email == email))
    }

    fn exists_by_id(&self, id: CustomerId) -> RepoResult<bool> {
        self.record("exists_by_id");
        Ok(self.rows.borrow().iter().any(|row| row.id == Some(id)))
    }

    fn delete_customer(&self, id: CustomerId) -> RepoResult<()> {
        self.record("delete_customer");
        self.rows.borrow_mut().retain(|row| row.id != Some(id));
        Ok(())
    }

    fn update_customer(&self, update: &CustomerUpdate) -> RepoResult<()> {
        self.record("update_customer");
        self.updates.borrow_mut().push(update.clone());
        if let Some(row) = self
            .rows
            .borrow_mut()
            .iter_mut()
            .find(|row| row.id == Some(update.id))
        {
            update.apply_to(row);
        }
        Ok(())
    }
}

#[test]
fn get_all_customers_passes_through() {
    let repo = RecordingRepo::seeded(&[("Ann", "ann@x.com", 30)]);
    let service = CustomerService::new(&repo);

    let all = service.get_all_customers().unwrap();

    assert_eq!(all.len(), 1);
    assert_eq!(repo.calls(), vec!["list_customers"]);
}

#[test]
fn get_customer_missing_id_is_not_found_with_message() {
    let repo = RecordingRepo::default();
    let service = CustomerService::new(&repo);

    let err = service.get_customer(1).unwrap_err();

    assert!(matches!(err, CustomerServiceError::NotFound(1)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "customer with id [1] not found");
}

#[test]
fn register_checks_email_before_insert_with_unset_id() {
    let repo = RecordingRepo::default();
    let service = CustomerService::new(&repo);

    let id = service
        .register_customer(&CustomerRegistration::new("alex", "alex@x.com", 20))
        .unwrap();

    assert_eq!(repo.calls(), vec!["exists_by_email", "insert_customer"]);
    assert_eq!(
        repo.rows.borrow().clone(),
        vec![Customer::with_id(id, "alex", "alex@x.com", 20)]
    );
}

#[test]
fn register_duplicate_email_never_inserts() {
    let repo = RecordingRepo::seeded(&[("Ann", "ann@x.com", 30)]);
    let service = CustomerService::new(&repo);

    let err = service
        .register_customer(&CustomerRegistration::new("Other", "ann@x.com", 41))
        .unwrap_err();

    assert!(matches!(err, CustomerServiceError::DuplicateEmail(ref email) if email == "ann@x.com"));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("ann@x.com"));
    assert_eq!(repo.calls(), vec!["exists_by_email"]);
    assert_eq!(repo.rows.borrow().len(), 1);
}

#[test]
fn delete_checks_existence_first() {
    let repo = RecordingRepo::seeded(&[("Ann", "ann@x.com", 30)]);
    let service = CustomerService::new(&repo);

    service.delete_customer(1).unwrap();

    assert_eq!(repo.calls(), vec!["exists_by_id", "delete_customer"]);
    assert!(repo.rows.borrow().is_empty());
}

#[test]
fn delete_missing_id_fails_without_touching_store() {
    let repo = RecordingRepo::default();
    let service = CustomerService::new(&repo);

    let err = service.delete_customer(10).unwrap_err();

    assert!(matches!(err, CustomerServiceError::NotFound(10)));
    assert_eq!(repo.calls(), vec!["exists_by_id"]);
}

#[test]
fn update_sends_fully_merged_record() {
    let repo = RecordingRepo::seeded(&[("Alex", "alex@x.com", 20)]);
    let service = CustomerService::new(&repo);

    service
        .update_customer(
            1,
            &CustomerPatch {
                age: Some(21),
                ..CustomerPatch::default()
            },
        )
        .unwrap();

    assert_eq!(
        repo.updates.borrow().clone(),
        vec![CustomerUpdate {
            id: 1,
            name: Some("Alex".to_string()),
            email: Some("alex@x.com".to_string()),
            age: Some(21),
        }]
    );
}

#[test]
fn update_can_change_all_properties() {
    let repo = RecordingRepo::seeded(&[("Alex", "alex@x.com", 20)]);
    let service = CustomerService::new(&repo);

    service
        .update_customer(
            1,
            &CustomerPatch {
                name: Some("Alexandra".to_string()),
                email: Some("alex.1@x.com".to_string()),
                age: Some(22),
            },
        )
        .unwrap();

    assert_eq!(
        repo.rows.borrow()[0],
        Customer::with_id(1, "Alexandra", "alex.1@x.com", 22)
    );
    assert_eq!(
        repo.calls(),
        vec!["get_customer", "exists_by_email", "update_customer"]
    );
}

#[test]
fn update_with_current_email_skips_uniqueness_check() {
    let repo = RecordingRepo::seeded(&[("Alex", "alex@x.com", 20)]);
    let service = CustomerService::new(&repo);

    service
        .update_customer(
            1,
            &CustomerPatch {
                name: Some("Al".to_string()),
                email: Some("alex@x.com".to_string()),
                age: None,
            },
        )
        .unwrap();

    assert_eq!(repo.calls(), vec!["get_customer", "update_customer"]);
}

#[test]
fn update_taken_email_is_conflict_and_writes_nothing() {
    let repo = RecordingRepo::seeded(&[("Alex", "alex@x.com", 20), ("Bo", "bo@x.com", 30)]);
    let service = CustomerService::new(&repo);

    let err = service
        .update_customer(
            1,
            &CustomerPatch {
                name: Some("Renamed".to_string()),
                email: Some("bo@x.com".to_string()),
                age: Some(99),
            },
        )
        .unwrap_err();

    assert!(matches!(err, CustomerServiceError::DuplicateEmail(ref email) if email == "bo@x.com"));
    assert!(repo.updates.borrow().is_empty());
    assert_eq!(
        repo.rows.borrow()[0],
        Customer::with_id(1, "Alex", "alex@x.com", 20)
    );
}

#[test]
fn update_without_effective_change_is_validation_error() {
    let repo = RecordingRepo::seeded(&[("Alex", "alex@x.com", 20)]);
    let service = CustomerService::new(&repo);

    let same_values = CustomerPatch {
        name: Some("Alex".to_string()),
        email: Some("alex@x.com".to_string()),
        age: Some(20),
    };
    let err = service.update_customer(1, &same_values).unwrap_err();
    assert!(matches!(err, CustomerServiceError::NoChanges));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "no data changes found");

    let empty = service
        .update_customer(1, &CustomerPatch::default())
        .unwrap_err();
    assert!(matches!(empty, CustomerServiceError::NoChanges));
    assert!(repo.updates.borrow().is_empty());
}

#[test]
fn update_missing_customer_is_not_found() {
    let repo = RecordingRepo::default();
    let service = CustomerService::new(&repo);

    let err = service
        .update_customer(
            5,
            &CustomerPatch {
                name: Some("X".to_string()),
                ..CustomerPatch::default()
            },
        )
        .unwrap_err();

    assert!(matches!(err, CustomerServiceError::NotFound(5)));
    assert_eq!(repo.calls(), vec!["get_customer"]);
}

#[test]
fn error_kinds_map_to_http_statuses() {
    assert_eq!(ErrorKind::NotFound.http_status(), 404);
    assert_eq!(ErrorKind::Conflict.http_status(), 409);
    assert_eq!(ErrorKind::Validation.http_status(), 400);
    assert_eq!(ErrorKind::Internal.http_status(), 500);
}

const BACKENDS: [StorageBackend; 2] = [StorageBackend::Query, StorageBackend::Orm];

#[test]
fn registration_roundtrips_on_every_backend() {
    for backend in BACKENDS {
        let conn = open_db_in_memory().unwrap();
        let service = CustomerService::new(open_customer_repository(backend, &conn).unwrap());

        let id = service
            .register_customer(&CustomerRegistration::new("Sam", "sam@x.com", 19))
            .unwrap();

        let listed = service.get_all_customers().unwrap();
        let expected = Customer::with_id(id, "Sam", "sam@x.com", 19);
        assert_eq!(listed, vec![expected.clone()], "backend {backend}");
        assert_eq!(service.get_customer(id).unwrap(), expected, "backend {backend}");
    }
}

#[test]
fn duplicate_registration_creates_single_record_on_every_backend() {
    for backend in BACKENDS {
        let conn = open_db_in_memory().unwrap();
        let service = CustomerService::new(open_customer_repository(backend, &conn).unwrap());
        let registration = CustomerRegistration::new("Sam", "sam@x.com", 19);

        service.register_customer(&registration).unwrap();
        let err = service.register_customer(&registration).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict, "backend {backend}");
        assert_eq!(service.get_all_customers().unwrap().len(), 1, "backend {backend}");
    }
}

#[test]
fn field_isolation_and_conflict_short_circuit_on_every_backend() {
    for backend in BACKENDS {
        let conn = open_db_in_memory().unwrap();
        let service = CustomerService::new(open_customer_repository(backend, &conn).unwrap());
        let ann = service
            .register_customer(&CustomerRegistration::new("Ann", "ann@x.com", 30))
            .unwrap();
        service
            .register_customer(&CustomerRegistration::new("Bo", "bo@x.com", 40))
            .unwrap();

        service
            .update_customer(
                ann,
                &CustomerPatch {
                    name: Some("X".to_string()),
                    ..CustomerPatch::default()
                },
            )
            .unwrap();
        let renamed = service.get_customer(ann).unwrap();
        assert_eq!(
            renamed,
            Customer::with_id(ann, "X", "ann@x.com", 30),
            "backend {backend}"
        );

        let err = service
            .update_customer(
                ann,
                &CustomerPatch {
                    name: Some("Y".to_string()),
                    email: Some("bo@x.com".to_string()),
                    age: Some(31),
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict, "backend {backend}");
        assert_eq!(service.get_customer(ann).unwrap(), renamed, "backend {backend}");
    }
}

#[test]
fn delete_then_get_is_not_found_on_every_backend() {
    for backend in BACKENDS {
        let conn = open_db_in_memory().unwrap();
        let service = CustomerService::new(open_customer_repository(backend, &conn).unwrap());
        let id = service
            .register_customer(&CustomerRegistration::new("Temp", "temp@x.com", 22))
            .unwrap();

        service.delete_customer(id).unwrap();

        assert!(matches!(
            service.get_customer(id),
            Err(CustomerServiceError::NotFound(missing)) if missing == id
        ));
        assert!(matches!(
            service.delete_customer(id),
            Err(CustomerServiceError::NotFound(_))
        ));
    }
}

#[test]
fn storage_failures_surface_as_internal() {
    let conn = open_db_in_memory().unwrap();
    let service =
        CustomerService::new(open_customer_repository(StorageBackend::Query, &conn).unwrap());
    conn.execute_batch("DROP TABLE customer;").unwrap();

    let err = service.get_all_customers().unwrap_err();

    assert!(matches!(err, CustomerServiceError::Repo(_)));
    assert_eq!(err.kind(), ErrorKind::Internal);
}
