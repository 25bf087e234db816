// Copyright (c) 2024, Nick Stevens <nick@bitcurry.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/license/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use rand::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;

pub(crate) fn random_bytes(seed: u64, size: usize) -> Box<[u8]> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let mut bytes = vec![0u8; size];
    rng.fill_bytes(&mut bytes);
    bytes.into_boxed_slice()
}
