use argon2_hasher::HashOptions;
use proptest::{
    arbitrary::{any, Arbitrary},
    collection::vec,
    prop_compose,
    strategy::{BoxedStrategy, Strategy},
};

/// Cheap options, for tests that are not concerned with the cost parameters.
#[allow(unused)]
pub fn fast_options() -> HashOptions {
    HashOptions::default().with_time_cost(1).with_memory_cost(6)
}

#[allow(unused)]
#[derive(Debug, Clone)]
pub struct HashInput {
    pub plaintext: Vec<u8>,
    pub salt: Vec<u8>,
    pub options: HashOptions,
}

prop_compose! {
    fn arb_hash_input()(
        plaintext in vec(any::<u8>(), 0..64),
        salt in vec(any::<u8>(), 8..32),
        options in any::<HashOptions>(),
    ) -> HashInput {
        HashInput { plaintext, salt, options }
    }
}

impl Arbitrary for HashInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        arb_hash_input().boxed()
    }
}

/// A [`HashInput`] along with a plaintext different from the hashed one.
#[allow(unused)]
#[derive(Debug, Clone)]
pub struct HashInputWithImpostor {
    pub input: HashInput,
    pub impostor: Vec<u8>,
}

prop_compose! {
    fn arb_hash_input_with_impostor()(
        input in any::<HashInput>(),
        impostor in vec(any::<u8>(), 0..64),
    ) -> HashInputWithImpostor {
        HashInputWithImpostor { input, impostor }
    }
}

impl Arbitrary for HashInputWithImpostor {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        arb_hash_input_with_impostor()
            .prop_filter("Impostor must differ from the plaintext", |value| {
                value.impostor != value.input.plaintext
            })
            .boxed()
    }
}
