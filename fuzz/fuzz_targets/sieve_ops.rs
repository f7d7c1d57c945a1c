#![no_main]
use bitsieve::BitSieve;
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Set(u16),
    Clear(u16),
    Toggle(u16),
    SetAll,
    ClearAll,
    ToggleAll,
    Resize(u16),
    SetSeries(u16, u8),
    ClearSeries(u16, u8),
}

fuzz_target!(|data: (u16, u16, Vec<Op>)| {
    let (size, slack, ops) = data;
    let (size, capacity) = (size as usize % 4096, size as usize % 4096 + slack as usize % 512);
    let mut sieve = BitSieve::new(size, capacity).unwrap();
    // model of [0, size); bulk ops on the sieve also touch the don't-care tail
    let mut model = vec![false; size];

    for op in ops {
        match op {
            Op::Set(i) => {
                let i = i as usize;
                assert_eq!(sieve.set(i).is_ok(), i < model.len());
                if i < model.len() {
                    model[i] = true;
                }
            }
            Op::Clear(i) => {
                let i = i as usize;
                assert_eq!(sieve.clear(i).is_ok(), i < model.len());
                if i < model.len() {
                    model[i] = false;
                }
            }
            Op::Toggle(i) => {
                let i = i as usize;
                assert_eq!(sieve.toggle(i).is_ok(), i < model.len());
                if i < model.len() {
                    model[i] = !model[i];
                }
            }
            Op::SetAll => {
                sieve.set_all();
                model.fill(true);
            }
            Op::ClearAll => {
                sieve.clear_all();
                model.fill(false);
            }
            Op::ToggleAll => {
                sieve.toggle_all();
                model.iter_mut().for_each(|bit| *bit = !*bit);
            }
            Op::Resize(n) => {
                let n = n as usize;
                let ok = sieve.resize(n).is_ok();
                assert_eq!(ok, n <= sieve.capacity());
                if ok {
                    model = vec![false; n];
                }
            }
            Op::SetSeries(start, step) => {
                let step = step as usize;
                assert_eq!(sieve.set_series(start as usize, step).is_ok(), step > 0);
                if step > 0 {
                    for i in (start as usize..model.len()).step_by(step) {
                        model[i] = true;
                    }
                }
            }
            Op::ClearSeries(start, step) => {
                let step = step as usize;
                assert_eq!(sieve.clear_series(start as usize, step).is_ok(), step > 0);
                if step > 0 {
                    for i in (start as usize..model.len()).step_by(step) {
                        model[i] = false;
                    }
                }
            }
        }
    }

    let expected: Vec<usize> = (0..model.len()).filter(|&i| model[i]).collect();
    assert_eq!(sieve.size(), model.len());
    assert_eq!(sieve.count(), expected.len());
    assert_eq!(sieve.to_positions(), expected);
    assert_eq!(sieve.ones().collect::<Vec<_>>(), expected);
    for (i, &bit) in model.iter().enumerate() {
        assert_eq!(sieve.get(i), Some(bit));
    }
});
