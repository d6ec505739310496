// tests/order_assembly_tests.rs
mod common;

use commerce_core::store::memory::{FaultKind, FaultPoint};
use commerce_core::{Entity, LineItem, OrderDraft, OrderError};
use common::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_successful_order_debits_stock_and_persists_items() {
  setup_tracing();
  let fx = Fixture::new().await;
  let p1 = fx.product("kettle", 5).await;
  let p2 = fx.product("mug", 10).await;

  let order = fx
    .book
    .create_order(Some(OrderDraft::new(
      fx.customer,
      [LineItem::new(p1, 3), LineItem::new(p2, 4)],
    )))
    .await
    .unwrap();

  assert!(order.id > 0);
  assert_eq!(order.user_id, fx.customer);
  assert_eq!(order.items.len(), 2);
  assert!(order.items.iter().all(|i| i.order_id == order.id && i.id > 0));
  assert_eq!(fx.stock(p1).await, 2);
  assert_eq!(fx.stock(p2).await, 6);
  assert_eq!(fx.row_counts().await, (1, 2));
}

#[tokio::test]
#[serial]
async fn test_second_order_over_remaining_stock_fails_and_leaves_stock() {
  setup_tracing();
  let fx = Fixture::new().await;
  let p1 = fx.product("kettle", 5).await;

  fx.book
    .create_order(Some(OrderDraft::new(fx.customer, [LineItem::new(p1, 3)])))
    .await
    .unwrap();
  assert_eq!(fx.stock(p1).await, 2);

  let err = fx
    .book
    .create_order(Some(OrderDraft::new(fx.customer, [LineItem::new(p1, 3)])))
    .await
    .unwrap_err();

  match err {
    OrderError::InsufficientStock {
      product_id,
      available,
      requested,
    } => {
      assert_eq!(product_id, p1);
      assert_eq!(available, 2);
      assert_eq!(requested, 3);
    }
    other => panic!("Expected InsufficientStock, got {:?}", other),
  }
  assert_eq!(fx.stock(p1).await, 2);
  assert_eq!(fx.row_counts().await, (1, 1));
}

#[tokio::test]
#[serial]
async fn test_unknown_user_is_a_referential_error_and_writes_nothing() {
  setup_tracing();
  let fx = Fixture::new().await;
  let p1 = fx.product("kettle", 5).await;

  let err = fx
    .book
    .create_order(Some(OrderDraft::new(999, [LineItem::new(p1, 1)])))
    .await
    .unwrap_err();

  match err {
    OrderError::ReferentialIntegrity { entity, missing_ids } => {
      assert_eq!(entity, Entity::User);
      assert_eq!(missing_ids, vec![999]);
    }
    other => panic!("Expected ReferentialIntegrity, got {:?}", other),
  }
  assert_eq!(fx.stock(p1).await, 5);
  assert_eq!(fx.row_counts().await, (0, 0));
}

#[tokio::test]
#[serial]
async fn test_missing_product_is_named_and_other_stock_is_untouched() {
  setup_tracing();
  let fx = Fixture::new().await;
  let p7 = fx.product("kettle", 5).await;
  let ghost = p7 + 1;

  let err = fx
    .book
    .create_order(Some(OrderDraft::new(
      fx.customer,
      [LineItem::new(p7, 1), LineItem::new(ghost, 1)],
    )))
    .await
    .unwrap_err();

  match err {
    OrderError::ReferentialIntegrity { entity, missing_ids } => {
      assert_eq!(entity, Entity::Product);
      assert_eq!(missing_ids, vec![ghost]);
    }
    other => panic!("Expected ReferentialIntegrity, got {:?}", other),
  }
  assert_eq!(fx.stock(p7).await, 5);
  assert_eq!(fx.row_counts().await, (0, 0));
}

#[tokio::test]
#[serial]
async fn test_structurally_invalid_drafts_are_rejected_before_the_store() {
  setup_tracing();
  let fx = Fixture::new().await;
  let p1 = fx.product("kettle", 5).await;
  // A fault armed at the first store call would fire if validation reached the store.
  fx.store.inject_fault(FaultPoint::LockProducts, FaultKind::Backend);

  let null = fx.book.create_order(None).await.unwrap_err();
  assert!(matches!(null, OrderError::InvalidArgument(ref m) if m.contains("null")));

  let empty = fx
    .book
    .create_order(Some(OrderDraft::new(fx.customer, [])))
    .await
    .unwrap_err();
  assert!(matches!(empty, OrderError::InvalidArgument(ref m) if m.contains("at least one item")));

  let zero = fx
    .book
    .create_order(Some(OrderDraft::new(fx.customer, [LineItem::new(p1, 0)])))
    .await
    .unwrap_err();
  assert!(matches!(zero, OrderError::InvalidArgument(_)));

  let negative = fx
    .book
    .create_order(Some(OrderDraft::new(fx.customer, [LineItem::new(p1, -2)])))
    .await
    .unwrap_err();
  assert!(matches!(negative, OrderError::InvalidArgument(_)));

  assert_eq!(fx.stock(p1).await, 5);
  assert_eq!(fx.row_counts().await, (0, 0));
}

#[tokio::test]
#[serial]
async fn test_repeated_lines_for_one_product_share_its_stock() {
  setup_tracing();
  let fx = Fixture::new().await;
  let p1 = fx.product("kettle", 5).await;

  let err = fx
    .book
    .create_order(Some(OrderDraft::new(
      fx.customer,
      [LineItem::new(p1, 3), LineItem::new(p1, 3)],
    )))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    OrderError::InsufficientStock { available: 2, requested: 3, .. }
  ));
  assert_eq!(fx.stock(p1).await, 5);

  let order = fx
    .book
    .create_order(Some(OrderDraft::new(
      fx.customer,
      [LineItem::new(p1, 2), LineItem::new(p1, 3)],
    )))
    .await
    .unwrap();
  assert_eq!(order.items.len(), 2);
  assert_eq!(fx.stock(p1).await, 0);
}

#[tokio::test]
#[serial]
async fn test_exact_stock_can_be_ordered_down_to_zero() {
  setup_tracing();
  let fx = Fixture::new().await;
  let p1 = fx.product("kettle", 4).await;

  fx.book
    .create_order(Some(OrderDraft::new(fx.customer, [LineItem::new(p1, 4)])))
    .await
    .unwrap();
  assert_eq!(fx.stock(p1).await, 0);
}

async fn assert_commit_failure_rolls_back(point: FaultPoint, kind: FaultKind) {
  let fx = Fixture::new().await;
  let p1 = fx.product("kettle", 5).await;
  let p2 = fx.product("mug", 3).await;
  fx.store.inject_fault(point, kind);

  let err = fx
    .book
    .create_order(Some(OrderDraft::new(
      fx.customer,
      [LineItem::new(p1, 2), LineItem::new(p2, 1)],
    )))
    .await
    .unwrap_err();

  match kind {
    FaultKind::Constraint => assert!(
      matches!(err, OrderError::ConstraintViolation(_)),
      "{:?} at {:?}",
      err,
      point
    ),
    FaultKind::Backend => assert!(matches!(err, OrderError::Persistence { .. }), "{:?} at {:?}", err, point),
  }
  assert_eq!(fx.stock(p1).await, 5, "stock changed after fault at {:?}", point);
  assert_eq!(fx.stock(p2).await, 3, "stock changed after fault at {:?}", point);
  assert_eq!(fx.row_counts().await, (0, 0), "rows survived fault at {:?}", point);
}

#[tokio::test]
#[serial]
async fn test_failures_during_commit_leave_no_partial_state() {
  setup_tracing();
  for point in [
    FaultPoint::DebitStock,
    FaultPoint::InsertOrder,
    FaultPoint::InsertOrderItems,
    FaultPoint::Commit,
  ] {
    assert_commit_failure_rolls_back(point, FaultKind::Constraint).await;
    assert_commit_failure_rolls_back(point, FaultKind::Backend).await;
  }
}

#[tokio::test]
#[serial]
async fn test_read_after_write_returns_submitted_lines() {
  setup_tracing();
  let fx = Fixture::new().await;
  let p1 = fx.product("kettle", 5).await;
  let p2 = fx.product("mug", 10).await;

  let created = fx
    .book
    .create_order(Some(OrderDraft::new(
      fx.customer,
      [LineItem::new(p1, 1), LineItem::new(p2, 7)],
    )))
    .await
    .unwrap();

  let fetched = fx.book.order(created.id).await.unwrap();
  assert_eq!(fetched, created);
  let quantities: Vec<(i64, i32)> = fetched.items.iter().map(|i| (i.product_id, i.quantity)).collect();
  assert_eq!(quantities, vec![(p1, 1), (p2, 7)]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_concurrent_orders_never_oversell() {
  setup_tracing();
  let fx = Fixture::new().await;
  let p1 = fx.product("kettle", 5).await;

  let mut handles = Vec::new();
  for _ in 0..8 {
    let book = fx.book.clone();
    let user = fx.customer;
    handles.push(tokio::spawn(async move {
      book
        .create_order(Some(OrderDraft::new(user, [LineItem::new(p1, 3)])))
        .await
    }));
  }

  let mut committed = 0;
  for handle in handles {
    match handle.await.unwrap() {
      Ok(_) => committed += 1,
      Err(OrderError::InsufficientStock { .. }) => {}
      Err(other) => panic!("Unexpected error: {:?}", other),
    }
  }

  assert_eq!(committed, 1);
  assert_eq!(fx.stock(p1).await, 2);
  assert_eq!(fx.row_counts().await, (1, 1));
}
