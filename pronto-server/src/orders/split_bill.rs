//! 分单结算
//!
//! A split divides the session total among payers. The session is settled
//! exactly once: on the call that marks the last pending person paid.

use shared::models::{
    DiningSession, PayPersonResult, PersonPaymentStatus, SplitBill, SplitBillDetail,
    SplitBillPerson, SplitCreate, SplitStatus, SplitType,
};

use super::error::{OrderError, OrderResult};
use super::money;
use super::service::{OrderService, now_millis};
use super::state_machine::{self, Actor, TransitionPayload};

/// Payment method recorded on the session when a split settles it
pub const SPLIT_PAYMENT_METHOD: &str = "split_bill";

/// Upper bound on payers per split
pub const MAX_SPLIT_PEOPLE: u32 = 50;

impl OrderService {
    /// Divide the session total among payers
    pub fn create_split(&self, session_id: u64, req: SplitCreate) -> OrderResult<SplitBillDetail> {
        let txn = self.store.begin_write()?;
        let session = self.load_session_txn(&txn, session_id)?;
        if !session.status.is_active() {
            return Err(OrderError::SessionNotOpen {
                id: session.id,
                status: session.status,
            });
        }
        if self.store.active_split_txn(&txn, session_id)?.is_some() {
            return Err(OrderError::SplitAlreadyActive);
        }
        if session.total_amount <= 0.0 {
            return Err(OrderError::Validation(
                "session has nothing to split".to_string(),
            ));
        }
        if let Some(blocking) = self
            .store
            .session_orders_txn(&txn, session_id)?
            .into_iter()
            .find(|o| o.workflow_status.is_before_delivery())
        {
            return Err(OrderError::NotSettleable {
                order_id: blocking.id,
                status: blocking.workflow_status,
            });
        }

        let (split_type, shares) = split_shares(&session, req)?;

        let now = now_millis();
        let split_id = self.store.next_id::<SplitBill>(&txn)?;
        let mut people = Vec::with_capacity(shares.len());
        for (idx, amount) in shares.into_iter().enumerate() {
            let person = SplitBillPerson {
                id: self.store.next_id::<SplitBillPerson>(&txn)?,
                split_bill_id: split_id,
                person_number: idx as u32 + 1,
                total_amount: amount,
                payment_status: PersonPaymentStatus::Pending,
                payment_method: None,
                paid_at: None,
            };
            self.store.put(&txn, &person)?;
            people.push(person);
        }
        let split = SplitBill {
            id: split_id,
            session_id,
            split_type,
            status: SplitStatus::Active,
            total_amount: session.total_amount,
            person_ids: people.iter().map(|p| p.id).collect(),
            created_at: now,
            completed_at: None,
        };
        self.store.put(&txn, &split)?;
        self.store.set_active_split(&txn, session_id, split_id)?;
        self.store.commit(txn)?;

        tracing::info!(
            split_id,
            session_id,
            people = people.len(),
            total = split.total_amount,
            "Split bill created"
        );
        Ok(SplitBillDetail { split, people })
    }

    pub fn get_split(&self, split_id: u64) -> OrderResult<SplitBillDetail> {
        let split = self
            .store
            .get::<SplitBill>(split_id)?
            .ok_or(OrderError::SplitNotFound(split_id))?;
        let mut people = Vec::with_capacity(split.person_ids.len());
        for person_id in &split.person_ids {
            let person = self
                .store
                .get::<SplitBillPerson>(*person_id)?
                .ok_or(OrderError::SplitPersonNotFound(*person_id))?;
            people.push(person);
        }
        Ok(SplitBillDetail { split, people })
    }

    /// Record one payer's share; settles the session on the last one
    pub fn pay_person(
        &self,
        person_id: u64,
        payment_method: Option<String>,
        actor: &Actor,
    ) -> OrderResult<PayPersonResult> {
        state_machine::check_collect(actor, &self.policy)?;
        let payment_method = payment_method
            .filter(|m| !m.trim().is_empty())
            .ok_or(OrderError::PaymentMethodRequired)?;

        let txn = self.store.begin_write()?;
        let mut person = self
            .store
            .get_txn::<SplitBillPerson>(&txn, person_id)?
            .ok_or(OrderError::SplitPersonNotFound(person_id))?;
        let mut split = self
            .store
            .get_txn::<SplitBill>(&txn, person.split_bill_id)?
            .ok_or(OrderError::SplitNotFound(person.split_bill_id))?;
        if split.status == SplitStatus::Completed {
            return Err(OrderError::SplitAlreadyCompleted);
        }
        if person.payment_status == PersonPaymentStatus::Paid {
            return Err(OrderError::SplitPersonAlreadyPaid(person_id));
        }

        let now = now_millis();
        person.payment_status = PersonPaymentStatus::Paid;
        person.payment_method = Some(payment_method);
        person.paid_at = Some(now);
        self.store.put(&txn, &person)?;

        let mut split_completed = true;
        for id in &split.person_ids {
            let paid = self
                .store
                .get_txn::<SplitBillPerson>(&txn, *id)?
                .is_some_and(|p| p.payment_status == PersonPaymentStatus::Paid);
            split_completed &= paid;
        }

        let mut events = Vec::new();
        let session: DiningSession = if split_completed {
            split.status = SplitStatus::Completed;
            split.completed_at = Some(now);
            self.store.put(&txn, &split)?;
            self.store.clear_active_split(&txn, split.session_id)?;
            let (mut session, orders) = self.settleable_orders_txn(&txn, split.session_id)?;
            let payload = TransitionPayload::payment(SPLIT_PAYMENT_METHOD)
                .with_reference(format!("split-{}", split.id));
            self.settle_orders_txn(&txn, &mut session, orders, actor, &payload, &mut events)?;
            session
        } else {
            self.load_session_txn(&txn, split.session_id)?
        };
        self.store.commit(txn)?;

        tracing::info!(
            person_id,
            split_id = split.id,
            %actor,
            split_completed,
            session_status = ?session.status,
            "Split bill person paid"
        );
        self.dispatch(events);
        Ok(PayPersonResult {
            person,
            split_completed,
            session_status: session.status,
        })
    }
}

/// Per-person amounts for a split request
fn split_shares(session: &DiningSession, req: SplitCreate) -> OrderResult<(SplitType, Vec<f64>)> {
    match req {
        SplitCreate::Equal { number_of_people } => {
            if number_of_people < 2 {
                return Err(OrderError::Validation(
                    "number_of_people must be at least 2".to_string(),
                ));
            }
            if number_of_people > MAX_SPLIT_PEOPLE {
                return Err(OrderError::Validation(format!(
                    "number_of_people must be at most {}",
                    MAX_SPLIT_PEOPLE
                )));
            }
            let shares = money::equal_shares(session.total_amount, number_of_people).ok_or_else(
                || {
                    OrderError::Validation(format!(
                        "{:.2} cannot be split among {} people",
                        session.total_amount, number_of_people
                    ))
                },
            )?;
            Ok((SplitType::Equal, shares))
        }
        SplitCreate::Custom { amounts } => {
            if amounts.len() < 2 || amounts.len() > MAX_SPLIT_PEOPLE as usize {
                return Err(OrderError::Validation(
                    format!("a custom split needs 2 to {} amounts", MAX_SPLIT_PEOPLE),
                ));
            }
            if amounts.iter().any(|a| !a.is_finite() || *a <= 0.0) {
                return Err(OrderError::Validation(
                    "split amounts must be positive".to_string(),
                ));
            }
            let sum: rust_decimal::Decimal = amounts.iter().map(|a| money::to_decimal(*a)).sum();
            let sum = money::to_f64(sum);
            if !money::amounts_match(sum, session.total_amount) {
                return Err(OrderError::SplitAmountMismatch {
                    expected: session.total_amount,
                    actual: sum,
                });
            }
            let amounts = amounts
                .into_iter()
                .map(|a| money::to_f64(money::to_decimal(a)))
                .collect();
            Ok((SplitType::Custom, amounts))
        }
    }
}
