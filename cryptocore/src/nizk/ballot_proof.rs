// Copyright (C) Microsoft Corporation. All rights reserved.

//! The ballot NIZK: a single top-level disjunction `R1 v R2 v R3` (section
//! 4.4 of the design) proving that a posted ballot was constructed either by
//! the voter casting a real vote (`R1`, itself flattened into one branch per
//! candidate plus an abstention branch) or by the Voting Server obfuscating
//! the voter's prior entry (`R2` if that entry's claimed index list was
//! correct, `R3` if it was not). All branches share the same `(ctv, ctlv,
//! ctlid)` public values, which is what makes the disjunction zero-knowledge
//! over which relation actually holds.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::el_gamal::{self, Ciphertext, PublicKey};
use crate::errors::{CryptoError, CryptoResult};
use crate::group::{Point, Scalar};
use crate::nizk::sigma::{self, Branch, LinearStatement, OrProof, QuadraticRelation};

const W_SK_ID: &str = "sk_id";
const W_LV: &str = "lv";
const W_R_LV: &str = "r_lv";
const W_R_LID: &str = "r_lid";
const W_SK_VS: &str = "sk_vs";
const W_WINV: &str = "winv";

fn w_r_v(i: usize) -> String {
    format!("r_v_{i}")
}

/// Everything needed to (re)build the branches of the ballot statement, from
/// the submitted ballot's own fields plus the two preceding CBR entries.
/// Built once by the caller (the voter's client when proving, the Voting
/// Server both when obfuscating and when validating a submission) from
/// public data -- nothing here is secret.
#[derive(Clone, Debug)]
pub struct BallotStatement {
    pub pk_ts: PublicKey,
    pub pk_vs: PublicKey,
    pub upk: Point,
    pub num_candidates: usize,
    /// The submitted ballot's own ciphertexts -- the values every branch's
    /// statements are expressed in terms of.
    pub ctv: Vec<Ciphertext>,
    pub ctlv: Ciphertext,
    pub ctlid: Ciphertext,
    /// `2 * ctlid*`, the successor-index encoding derived from the voter's
    /// last CBR ballot (see [`BallotStatement::derive_from_last`]).
    pub ct_i: Ciphertext,
    /// `ctlv* - ctlid*`, a ciphertext of the voter's index-list reporting
    /// error at the prior step, also derived from the last CBR ballot.
    pub delta: Ciphertext,
    /// `ctv` of the voter's last CBR ballot (the re-encryption source for R2).
    pub ctv_last: Vec<Ciphertext>,
    /// `ctv` of the voter's previous-to-last CBR ballot (the re-encryption
    /// source for R3, which skips the (list-tampered) last ballot).
    pub ctv_prev_last: Vec<Ciphertext>,
}

impl BallotStatement {
    /// Computes `ct_i` and `delta` from the voter's last ballot, per the
    /// proof statement in the design (section 4.4).
    pub fn derive_from_last(ctlv_last: Ciphertext, ctlid_last: Ciphertext) -> (Ciphertext, Ciphertext) {
        let ct_i = el_gamal::scale(ctlid_last, Scalar::from_u64(2));
        let delta = el_gamal::sub(ctlv_last, ctlid_last);
        (ct_i, delta)
    }
}

/// The witness behind one of the three relations. Only one variant is ever
/// held by a single party: a voter proving `R1` never learns `sk_vs`; the
/// Voting Server proving `R2`/`R3` never learns any voter's `sk_id`.
pub enum Witness {
    /// Real vote, proven by the voter. `choice` is the zero-based candidate
    /// index, or `None` for an abstention. `r_v` supplies the encryption
    /// randomness used for every `ctv[i]` (not just the chosen one -- all
    /// components were freshly encrypted), in candidate order.
    Voter {
        sk_id: Scalar,
        choice: Option<usize>,
        r_v: Vec<Scalar>,
        lv: u64,
        r_lv: Scalar,
        r_lid: Scalar,
    },
    /// VS obfuscation where the voter's last reported index list was correct
    /// (`delta` decrypts to zero). `r_v` is the re-encryption randomness
    /// applied to the last ballot's `ctv`.
    VsR2 {
        sk_vs: Scalar,
        r_v: Vec<Scalar>,
        r_lv: Scalar,
        r_lid: Scalar,
    },
    /// VS obfuscation where the last reported index list was wrong (`delta`
    /// decrypts to a nonzero `w`). `winv` is `w^{-1} mod q`. `r_v` is the
    /// re-encryption randomness applied to the previous-to-last ballot's
    /// `ctv` (the tampered last ballot is skipped).
    VsR3 {
        sk_vs: Scalar,
        winv: Scalar,
        r_v: Vec<Scalar>,
        r_lv: Scalar,
        r_lid: Scalar,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BallotProof {
    pub or_proof: OrProof,
}

/// `ctlid = ReEnc(pk_vs, ct_i, r_lid)`, shared by all three relations.
fn ctlid_statements(ctlid: Ciphertext, ct_i: Ciphertext, pk_vs: Point) -> Vec<LinearStatement> {
    vec![
        LinearStatement::with_offset(ctlid.c0, ct_i.c0, vec![(W_R_LID.into(), Point::generator())]),
        LinearStatement::with_offset(ctlid.c1, ct_i.c1, vec![(W_R_LID.into(), pk_vs)]),
    ]
}

/// `ctlv = Enc(pk_vs, lv, r_lv)` -- R1 only: a fresh encryption of the
/// voter-chosen bitmask, not a re-encryption.
fn ctlv_encrypt_statements(ctlv: Ciphertext, pk_vs: Point) -> Vec<LinearStatement> {
    vec![
        LinearStatement::new(ctlv.c0, vec![(W_R_LV.into(), Point::generator())]),
        LinearStatement::new(ctlv.c1, vec![(W_LV.into(), Point::generator()), (W_R_LV.into(), pk_vs)]),
    ]
}

/// `ctlv = ReEnc(pk_vs, ct_i, r_lv)` -- R2/R3.
fn ctlv_reenc_statements(ctlv: Ciphertext, ct_i: Ciphertext, pk_vs: Point) -> Vec<LinearStatement> {
    vec![
        LinearStatement::with_offset(ctlv.c0, ct_i.c0, vec![(W_R_LV.into(), Point::generator())]),
        LinearStatement::with_offset(ctlv.c1, ct_i.c1, vec![(W_R_LV.into(), pk_vs)]),
    ]
}

/// `ctv[i] = Enc(pk_ts, [i == chosen], r_v_i)` for every candidate `i`
/// (`chosen = None` encodes an all-zero abstention) -- one R1 branch.
fn ctv_onehot_statements(ctv: &[Ciphertext], chosen: Option<usize>, pk_ts: Point) -> Vec<LinearStatement> {
    let mut stmts = Vec::with_capacity(ctv.len() * 2);
    for (i, ct) in ctv.iter().enumerate() {
        let bit = if chosen == Some(i) { 1 } else { 0 };
        stmts.push(LinearStatement::new(ct.c0, vec![(w_r_v(i), Point::generator())]));
        stmts.push(LinearStatement::with_offset(
            ct.c1,
            Point::encode_u64(bit),
            vec![(w_r_v(i), pk_ts)],
        ));
    }
    stmts
}

/// `ctv[i] = ReEnc(pk_ts, source[i], r_v_i)` for every candidate -- R2/R3.
fn ctv_reenc_statements(ctv: &[Ciphertext], source: &[Ciphertext], pk_ts: Point) -> Vec<LinearStatement> {
    let mut stmts = Vec::with_capacity(ctv.len() * 2);
    for (i, (ct, src)) in ctv.iter().zip(source.iter()).enumerate() {
        stmts.push(LinearStatement::with_offset(ct.c0, src.c0, vec![(w_r_v(i), Point::generator())]));
        stmts.push(LinearStatement::with_offset(ct.c1, src.c1, vec![(w_r_v(i), pk_ts)]));
    }
    stmts
}

fn build_branches(stmt: &BallotStatement) -> CryptoResult<Vec<Branch>> {
    let n = stmt.num_candidates;
    if stmt.ctv.len() != n || stmt.ctv_last.len() != n || stmt.ctv_prev_last.len() != n {
        return Err(CryptoError::MalformedBallot(
            "ctv length does not match candidate count".into(),
        ));
    }

    let mut branches = Vec::with_capacity(n + 3);

    // R1, flattened: one branch per candidate, plus one abstention branch.
    for j in 0..=n {
        let chosen = if j < n { Some(j) } else { None };
        let mut statements = vec![LinearStatement::new(stmt.upk, vec![(W_SK_ID.into(), Point::generator())])];
        statements.extend(ctv_onehot_statements(&stmt.ctv, chosen, stmt.pk_ts.0));
        statements.extend(ctlv_encrypt_statements(stmt.ctlv, stmt.pk_vs.0));
        statements.extend(ctlid_statements(stmt.ctlid, stmt.ct_i, stmt.pk_vs.0));
        branches.push(Branch::new(statements));
    }

    // R2: prior index list was honest.
    let mut r2 = vec![LinearStatement::new(stmt.delta.c1, vec![(W_SK_VS.into(), stmt.delta.c0)])];
    r2.extend(ctv_reenc_statements(&stmt.ctv, &stmt.ctv_last, stmt.pk_ts.0));
    r2.extend(ctlv_reenc_statements(stmt.ctlv, stmt.ct_i, stmt.pk_vs.0));
    r2.extend(ctlid_statements(stmt.ctlid, stmt.ct_i, stmt.pk_vs.0));
    branches.push(Branch::new(r2));

    // R3: prior index list was tampered with -- delta decrypts to nonzero.
    let mut r3 = ctv_reenc_statements(&stmt.ctv, &stmt.ctv_prev_last, stmt.pk_ts.0);
    r3.extend(ctlv_reenc_statements(stmt.ctlv, stmt.ct_i, stmt.pk_vs.0));
    r3.extend(ctlid_statements(stmt.ctlid, stmt.ct_i, stmt.pk_vs.0));
    let quadratic = QuadraticRelation {
        x_name: W_WINV.into(),
        y_name: W_SK_VS.into(),
        p: stmt.delta.c1,
        q: stmt.delta.c0,
        target: Point::generator(),
    };
    branches.push(Branch::with_quadratic(r3, quadratic));

    Ok(branches)
}

fn witness_map(stmt: &BallotStatement, witness: &Witness) -> (usize, std::collections::BTreeMap<String, Scalar>) {
    let n = stmt.num_candidates;
    let mut map = std::collections::BTreeMap::new();
    let real_idx = match witness {
        Witness::Voter { sk_id, choice, r_v, lv, r_lv, r_lid } => {
            map.insert(W_SK_ID.into(), *sk_id);
            for (i, r) in r_v.iter().enumerate() {
                map.insert(w_r_v(i), *r);
            }
            map.insert(W_LV.into(), Scalar::from_u64(*lv));
            map.insert(W_R_LV.into(), *r_lv);
            map.insert(W_R_LID.into(), *r_lid);
            choice.unwrap_or(n)
        }
        Witness::VsR2 { sk_vs, r_v, r_lv, r_lid } => {
            map.insert(W_SK_VS.into(), *sk_vs);
            for (i, r) in r_v.iter().enumerate() {
                map.insert(w_r_v(i), *r);
            }
            map.insert(W_R_LV.into(), *r_lv);
            map.insert(W_R_LID.into(), *r_lid);
            n + 1
        }
        Witness::VsR3 { sk_vs, winv, r_v, r_lv, r_lid } => {
            map.insert(W_SK_VS.into(), *sk_vs);
            map.insert(W_WINV.into(), *winv);
            for (i, r) in r_v.iter().enumerate() {
                map.insert(w_r_v(i), *r);
            }
            map.insert(W_R_LV.into(), *r_lv);
            map.insert(W_R_LID.into(), *r_lid);
            n + 2
        }
    };
    (real_idx, map)
}

pub fn prove(stmt: &BallotStatement, witness: &Witness, rng: &mut impl CryptoRngCore) -> CryptoResult<BallotProof> {
    let branches = build_branches(stmt)?;
    let (real_idx, witness_map) = witness_map(stmt, witness);
    let or_proof = sigma::prove_or(&branches, real_idx, &witness_map, rng)?;
    Ok(BallotProof { or_proof })
}

pub fn verify(stmt: &BallotStatement, proof: &BallotProof) -> CryptoResult<()> {
    let branches = build_branches(stmt)?;
    sigma::verify_or(&branches, &proof.or_proof)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::el_gamal::{self, SecretKey};

    struct Fixture {
        sk_ts: SecretKey,
        sk_vs: SecretKey,
        sk_id: Scalar,
        upk: Point,
        num_candidates: usize,
    }

    fn fixture(rng: &mut impl CryptoRngCore) -> Fixture {
        let sk_ts = SecretKey::random(rng);
        let sk_vs = SecretKey::random(rng);
        let sk_id = Scalar::random(rng);
        Fixture { sk_ts, sk_vs, upk: Point::generator() * sk_id, sk_id, num_candidates: 3 }
    }

    fn encrypt_vote(f: &Fixture, choice: Option<usize>, rng: &mut impl CryptoRngCore) -> (Vec<Ciphertext>, Vec<Scalar>) {
        let mut cts = Vec::with_capacity(f.num_candidates);
        let mut rs = Vec::with_capacity(f.num_candidates);
        for i in 0..f.num_candidates {
            let bit = if choice == Some(i) { 1 } else { 0 };
            let r = Scalar::random(rng);
            cts.push(el_gamal::encrypt(f.sk_ts.public_key(), bit, r));
            rs.push(r);
        }
        (cts, rs)
    }

    #[test]
    fn r1_honest_vote_verifies() {
        let mut rng = rand::rngs::OsRng;
        let f = fixture(&mut rng);
        let (ctv, r_v) = encrypt_vote(&f, Some(1), &mut rng);

        let lv = 0b101u64;
        let r_lv = Scalar::random(&mut rng);
        let ctlv = el_gamal::encrypt(f.sk_vs.public_key(), lv, r_lv);

        let ctlid_last = el_gamal::encrypt(f.sk_vs.public_key(), 2, Scalar::random(&mut rng));
        let ctlv_last = el_gamal::encrypt(f.sk_vs.public_key(), 0, Scalar::random(&mut rng));
        let (ct_i, delta) = BallotStatement::derive_from_last(ctlv_last, ctlid_last);

        let r_lid = Scalar::random(&mut rng);
        let ctlid = el_gamal::re_encrypt(f.sk_vs.public_key(), ct_i, r_lid);

        let stmt = BallotStatement {
            pk_ts: f.sk_ts.public_key(),
            pk_vs: f.sk_vs.public_key(),
            upk: f.upk,
            num_candidates: f.num_candidates,
            ctv: ctv.clone(),
            ctlv,
            ctlid,
            ct_i,
            delta,
            ctv_last: ctv.clone(),
            ctv_prev_last: ctv,
        };
        let witness = Witness::Voter {
            sk_id: f.sk_id,
            choice: Some(1),
            r_v,
            lv,
            r_lv,
            r_lid,
        };

        let proof = prove(&stmt, &witness, &mut rng).expect("prove");
        verify(&stmt, &proof).expect("verify");
    }

    #[test]
    fn r1_abstention_verifies() {
        let mut rng = rand::rngs::OsRng;
        let f = fixture(&mut rng);
        let (ctv, r_v) = encrypt_vote(&f, None, &mut rng);

        let r_lv = Scalar::random(&mut rng);
        let ctlv = el_gamal::encrypt(f.sk_vs.public_key(), 0, r_lv);
        let ctlid_last = el_gamal::encrypt(f.sk_vs.public_key(), 0, Scalar::random(&mut rng));
        let ctlv_last = el_gamal::encrypt(f.sk_vs.public_key(), 0, Scalar::random(&mut rng));
        let (ct_i, delta) = BallotStatement::derive_from_last(ctlv_last, ctlid_last);
        let r_lid = Scalar::random(&mut rng);
        let ctlid = el_gamal::re_encrypt(f.sk_vs.public_key(), ct_i, r_lid);

        let stmt = BallotStatement {
            pk_ts: f.sk_ts.public_key(),
            pk_vs: f.sk_vs.public_key(),
            upk: f.upk,
            num_candidates: f.num_candidates,
            ctv: ctv.clone(),
            ctlv,
            ctlid,
            ct_i,
            delta,
            ctv_last: ctv.clone(),
            ctv_prev_last: ctv,
        };
        let witness = Witness::Voter { sk_id: f.sk_id, choice: None, r_v, lv: 0, r_lv, r_lid };
        let proof = prove(&stmt, &witness, &mut rng).expect("prove");
        verify(&stmt, &proof).expect("verify");
    }

    #[test]
    fn r2_obfuscation_honest_list_verifies() {
        let mut rng = rand::rngs::OsRng;
        let f = fixture(&mut rng);
        let sk_vs_scalar = f.sk_vs.scalar();

        let (ctv_last, _) = encrypt_vote(&f, Some(0), &mut rng);
        let ctlid_last = el_gamal::encrypt(f.sk_vs.public_key(), 3, Scalar::random(&mut rng));
        // delta must decrypt to zero: ctlv_last = ctlid_last re-encrypted.
        let ctlv_last = el_gamal::re_encrypt(f.sk_vs.public_key(), ctlid_last, Scalar::random(&mut rng));
        let (ct_i, delta) = BallotStatement::derive_from_last(ctlv_last, ctlid_last);
        assert_eq!(el_gamal::decrypt_to_point(&f.sk_vs, delta), Point::identity());

        let r_v: Vec<Scalar> = (0..f.num_candidates).map(|_| Scalar::random(&mut rng)).collect();
        let ctv: Vec<Ciphertext> = ctv_last
            .iter()
            .zip(&r_v)
            .map(|(c, r)| el_gamal::re_encrypt(f.sk_ts.public_key(), *c, *r))
            .collect();
        let r_lv = Scalar::random(&mut rng);
        let ctlv = el_gamal::re_encrypt(f.sk_vs.public_key(), ct_i, r_lv);
        let r_lid = Scalar::random(&mut rng);
        let ctlid = el_gamal::re_encrypt(f.sk_vs.public_key(), ct_i, r_lid);

        let stmt = BallotStatement {
            pk_ts: f.sk_ts.public_key(),
            pk_vs: f.sk_vs.public_key(),
            upk: f.upk,
            num_candidates: f.num_candidates,
            ctv,
            ctlv,
            ctlid,
            ct_i,
            delta,
            ctv_last: ctv_last.clone(),
            ctv_prev_last: ctv_last,
        };
        let witness = Witness::VsR2 { sk_vs: sk_vs_scalar, r_v, r_lv, r_lid };
        let proof = prove(&stmt, &witness, &mut rng).expect("prove");
        verify(&stmt, &proof).expect("verify");
    }

    #[test]
    fn r3_obfuscation_bad_list_verifies() {
        let mut rng = rand::rngs::OsRng;
        let f = fixture(&mut rng);
        let sk_vs_scalar = f.sk_vs.scalar();

        let (ctv_prev_last, _) = encrypt_vote(&f, Some(2), &mut rng);
        let (ctv_last, _) = encrypt_vote(&f, Some(0), &mut rng);
        let ctlid_last = el_gamal::encrypt(f.sk_vs.public_key(), 3, Scalar::random(&mut rng));
        let w: u64 = 5;
        let ctlv_last = el_gamal::encrypt(f.sk_vs.public_key(), 3 + w, Scalar::random(&mut rng));
        let (ct_i, delta) = BallotStatement::derive_from_last(ctlv_last, ctlid_last);
        let winv = Scalar::from_u64(w).invert().expect("nonzero");

        let r_v: Vec<Scalar> = (0..f.num_candidates).map(|_| Scalar::random(&mut rng)).collect();
        let ctv: Vec<Ciphertext> = ctv_prev_last
            .iter()
            .zip(&r_v)
            .map(|(c, r)| el_gamal::re_encrypt(f.sk_ts.public_key(), *c, *r))
            .collect();
        let r_lv = Scalar::random(&mut rng);
        let ctlv = el_gamal::re_encrypt(f.sk_vs.public_key(), ct_i, r_lv);
        let r_lid = Scalar::random(&mut rng);
        let ctlid = el_gamal::re_encrypt(f.sk_vs.public_key(), ct_i, r_lid);

        let stmt = BallotStatement {
            pk_ts: f.sk_ts.public_key(),
            pk_vs: f.sk_vs.public_key(),
            upk: f.upk,
            num_candidates: f.num_candidates,
            ctv,
            ctlv,
            ctlid,
            ct_i,
            delta,
            ctv_last,
            ctv_prev_last,
        };
        let witness = Witness::VsR3 { sk_vs: sk_vs_scalar, winv, r_v, r_lv, r_lid };
        let proof = prove(&stmt, &witness, &mut rng).expect("prove");
        verify(&stmt, &proof).expect("verify");
    }

    #[test]
    fn tampered_ctv_is_rejected() {
        let mut rng = rand::rngs::OsRng;
        let f = fixture(&mut rng);
        let (ctv, r_v) = encrypt_vote(&f, Some(0), &mut rng);
        let r_lv = Scalar::random(&mut rng);
        let ctlv = el_gamal::encrypt(f.sk_vs.public_key(), 0, r_lv);
        let ctlid_last = el_gamal::encrypt(f.sk_vs.public_key(), 0, Scalar::random(&mut rng));
        let ctlv_last = el_gamal::encrypt(f.sk_vs.public_key(), 0, Scalar::random(&mut rng));
        let (ct_i, delta) = BallotStatement::derive_from_last(ctlv_last, ctlid_last);
        let r_lid = Scalar::random(&mut rng);
        let ctlid = el_gamal::re_encrypt(f.sk_vs.public_key(), ct_i, r_lid);

        let mut stmt = BallotStatement {
            pk_ts: f.sk_ts.public_key(),
            pk_vs: f.sk_vs.public_key(),
            upk: f.upk,
            num_candidates: f.num_candidates,
            ctv: ctv.clone(),
            ctlv,
            ctlid,
            ct_i,
            delta,
            ctv_last: ctv.clone(),
            ctv_prev_last: ctv,
        };
        let witness = Witness::Voter { sk_id: f.sk_id, choice: Some(0), r_v, lv: 0, r_lv, r_lid };
        let proof = prove(&stmt, &witness, &mut rng).expect("prove");

        // Swap in a ballot claiming a vote for a different candidate without
        // re-proving: verification against the tampered statement must fail.
        stmt.ctv.swap(0, 1);
        assert!(verify(&stmt, &proof).is_err());
    }
}
