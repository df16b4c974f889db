//! Scripted authority for testing and development.
//!
//! Each operation pops the next queued reply. An empty queue answers with
//! `AuthorityError::Unavailable`, which makes unscripted calls easy to spot.

use crate::authority::{
    AttendanceScanReply, AuthorityClient, AuthorityError, AuthorityResult, CheckInReply,
    CheckOutReply, RosterEntry, VerifyReply,
};
use gatepass_core::Credential;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Authority operations, for call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Verify,
    CheckIn,
    CheckOut,
    Attendance,
    Roster,
}

#[derive(Debug, Default)]
struct Script {
    verify: VecDeque<AuthorityResult<VerifyReply>>,
    check_in: VecDeque<AuthorityResult<CheckInReply>>,
    check_out: VecDeque<AuthorityResult<CheckOutReply>>,
    attendance: VecDeque<AuthorityResult<AttendanceScanReply>>,
    roster: VecDeque<AuthorityResult<Vec<RosterEntry>>>,
    calls: Vec<(Operation, Option<String>)>,
}

/// Authority that replays queued answers.
#[derive(Debug, Default)]
pub struct ScriptedAuthority {
    script: Mutex<Script>,
}

impl ScriptedAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next verification answer.
    pub fn push_verify(&self, reply: AuthorityResult<VerifyReply>) {
        self.lock().verify.push_back(reply);
    }

    /// Queue the next check-in answer.
    pub fn push_check_in(&self, reply: AuthorityResult<CheckInReply>) {
        self.lock().check_in.push_back(reply);
    }

    /// Queue the next check-out answer.
    pub fn push_check_out(&self, reply: AuthorityResult<CheckOutReply>) {
        self.lock().check_out.push_back(reply);
    }

    /// Queue the next attendance answer.
    pub fn push_attendance(&self, reply: AuthorityResult<AttendanceScanReply>) {
        self.lock().attendance.push_back(reply);
    }

    /// Queue the next roster answer.
    pub fn push_roster(&self, reply: AuthorityResult<Vec<RosterEntry>>) {
        self.lock().roster.push_back(reply);
    }

    /// Total number of calls received.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of calls received for one operation.
    pub fn calls_for(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|(op, _)| *op == operation)
            .count()
    }

    /// Credentials received, in call order.
    pub fn credentials(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|(_, credential)| credential.clone())
            .collect()
    }

    fn next<T>(
        &self,
        operation: Operation,
        credential: Option<&Credential>,
        queue: impl FnOnce(&mut Script) -> &mut VecDeque<AuthorityResult<T>>,
    ) -> AuthorityResult<T> {
        let mut script = self.lock();
        script
            .calls
            .push((operation, credential.map(|c| c.as_str().to_string())));
        queue(&mut *script).pop_front().unwrap_or_else(|| {
            Err(AuthorityError::unavailable(format!(
                "no scripted reply for {operation:?}"
            )))
        })
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuthorityClient for ScriptedAuthority {
    async fn verify(&self, credential: &Credential) -> AuthorityResult<VerifyReply> {
        self.next(Operation::Verify, Some(credential), |s| &mut s.verify)
    }

    async fn check_in(&self, credential: &Credential) -> AuthorityResult<CheckInReply> {
        self.next(Operation::CheckIn, Some(credential), |s| &mut s.check_in)
    }

    async fn check_out(&self, credential: &Credential) -> AuthorityResult<CheckOutReply> {
        self.next(Operation::CheckOut, Some(credential), |s| &mut s.check_out)
    }

    async fn scan_attendance(&self, credential: &Credential) -> AuthorityResult<AttendanceScanReply> {
        self.next(Operation::Attendance, Some(credential), |s| &mut s.attendance)
    }

    async fn signed_in_roster(&self) -> AuthorityResult<Vec<RosterEntry>> {
        self.next(Operation::Roster, None, |s| &mut s.roster)
    }
}
