use tapegrad::Vector;

// f(x) = sin(x) + cos(x) + x, f'(x) = cos(x) - sin(x) + 1
fn f(x: f64) -> f64 {
    x.sin() + x.cos() + x
}

fn main() {
    let h = 1e-9;
    let samples = 1000;

    let mut worst_nd = 0.0_f64;
    let mut worst_ad = 0.0_f64;

    for i in 0..samples {
        let x = -100.0 + 200.0 * i as f64 / (samples - 1) as f64;

        // forward difference
        let nd = (f(x + h) - f(x)) / h;

        let a = Vector::from_values(&[x]);
        let q = (&(a.sin() + a.cos()).expect("same length") + &a).expect("same length");
        q.backward();
        let ad = a.grad()[0];

        let gold = x.cos() - x.sin() + 1.0;
        worst_nd = worst_nd.max((nd - gold).abs());
        worst_ad = worst_ad.max((ad - gold).abs());

        if i % 100 == 0 {
            println!(
                "x = {:>9.3}  numerical error = {:.3e}  automatic error = {:.3e}",
                x,
                (nd - gold).abs(),
                (ad - gold).abs()
            );
        }
    }

    println!("max numerical diff error: {:.3e}", worst_nd);
    println!("max automatic diff error: {:.3e}", worst_ad);
}
